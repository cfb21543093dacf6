//! `envseal keygen` — generate the secret key and add it to the store.

use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::Result;
use crate::provision::{self, ProvisionOutcome};

/// Execute the `keygen` command.
pub async fn execute(cli: &Cli) -> Result<()> {
    let ctx = Context::load(cli)?;

    match provision::generate_and_store(&ctx.store, &ctx.secret_name).await? {
        ProvisionOutcome::Created => {
            output::success(&format!(
                "Secret '{}' generated and stored in {}",
                ctx.secret_name,
                ctx.store.display()
            ));
            output::tip("Keep this file out of version control.");
            output::tip("Run `envseal encrypt <FILE>` to encrypt a config file.");
        }
        ProvisionOutcome::AlreadyPresent => {
            output::info(&format!(
                "Secret '{}' already exists in {}, left unchanged",
                ctx.secret_name,
                ctx.store.display()
            ));
        }
    }

    Ok(())
}
