//! `envseal status` — show which entries are encrypted.

use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::crypto::is_encrypted;
use crate::errors::Result;
use crate::rewrite::ConfigDocument;

/// Execute the `status` command.
pub async fn execute(cli: &Cli, file: &str) -> Result<()> {
    let ctx = Context::load(cli)?;
    let path = ctx.resolve(file);
    let doc = ConfigDocument::load(&path).await?;

    let entries: Vec<_> = doc
        .entries()
        .into_iter()
        .map(|e| {
            let encrypted = is_encrypted(&e.value);
            (e, encrypted)
        })
        .collect();
    let plaintext = entries.iter().filter(|(_, enc)| !enc).count();

    output::print_status_table(&entries);
    if entries.is_empty() {
        return Ok(());
    }

    if plaintext == 0 {
        output::success(&format!("All {} entries are encrypted", entries.len()));
    } else {
        output::info(&format!(
            "{plaintext} of {} entries are plaintext",
            entries.len()
        ));
        output::tip("Run `envseal encrypt <FILE> [KEY...]` to encrypt them.");
    }

    Ok(())
}
