//! `envseal encrypt` — encrypt config values in place.

use crate::cli::output;
use crate::cli::{lookups, Cli, Context};
use crate::errors::Result;

/// Execute the `encrypt` command.
pub async fn execute(cli: &Cli, file: &str, targets: &[String]) -> Result<()> {
    let ctx = Context::load(cli)?;
    let path = ctx.resolve(file);
    let engine = ctx.engine()?;
    let secret = ctx.secret().await?;

    let report = engine
        .encrypt_file(&path, lookups(targets), &secret)
        .await?;

    for lookup in &report.unresolved {
        output::warning(&format!("No entry matches '{lookup}', skipped"));
    }

    if report.is_unchanged() {
        output::info(&format!(
            "Nothing to encrypt in {} ({} targeted, all already encrypted)",
            path.display(),
            report.targeted()
        ));
        return Ok(());
    }

    for key in &report.encrypted {
        output::info(&format!("  + {key}"));
    }
    output::success(&format!(
        "Encrypted {} value(s) in {}",
        report.newly_encrypted(),
        path.display()
    ));

    Ok(())
}
