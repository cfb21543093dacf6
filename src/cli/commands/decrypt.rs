//! `envseal decrypt` — print decrypted config values.

use crate::cli::output;
use crate::cli::{lookups, Cli, Context};
use crate::errors::{EnvSealError, Result};

/// Execute the `decrypt` command.
pub async fn execute(
    cli: &Cli,
    file: &str,
    targets: &[String],
    show_values: bool,
    json: bool,
) -> Result<()> {
    let ctx = Context::load(cli)?;
    let path = ctx.resolve(file);
    let engine = ctx.engine()?;
    let secret = ctx.secret().await?;

    let report = engine
        .decrypt_file(&path, lookups(targets), &secret)
        .await?;

    for lookup in &report.unresolved {
        output::warning(&format!("No entry matches '{lookup}', skipped"));
    }

    if json {
        let map: serde_json::Map<String, serde_json::Value> = report
            .entries
            .into_iter()
            .map(|e| (e.key, serde_json::Value::String(e.value)))
            .collect();
        let text = serde_json::to_string_pretty(&map)
            .map_err(|e| EnvSealError::CommandFailed(format!("JSON output: {e}")))?;
        println!("{text}");
        return Ok(());
    }

    output::print_revealed_table(&report.entries, show_values);
    if !show_values && !report.entries.is_empty() {
        output::tip("Pass --show-values to print plaintext.");
    }

    Ok(())
}
