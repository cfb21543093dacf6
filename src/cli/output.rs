//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::rewrite::{ConfigEntry, RevealedEntry};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of entries and whether each one is encrypted.
pub fn print_status_table(entries: &[(ConfigEntry, bool)]) {
    if entries.is_empty() {
        info("No KEY=VALUE entries in this file.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Line", "Key", "Encrypted"]);

    for (entry, encrypted) in entries {
        table.add_row(vec![
            (entry.line + 1).to_string(),
            entry.key.clone(),
            if *encrypted { "yes" } else { "no" }.to_string(),
        ]);
    }

    println!("{table}");
}

/// Print decrypted entries. Values are masked unless `show_values`.
pub fn print_revealed_table(entries: &[RevealedEntry], show_values: bool) {
    if entries.is_empty() {
        info("No matching entries.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Key", "Value", "Stored"]);

    for entry in entries {
        let value = if show_values {
            entry.value.clone()
        } else {
            mask(&entry.value)
        };
        table.add_row(vec![
            entry.key.clone(),
            value,
            if entry.was_encrypted { "encrypted" } else { "plaintext" }.to_string(),
        ]);
    }

    println!("{table}");
}

/// Fixed-width mask that only reveals the length.
fn mask(value: &str) -> String {
    format!("******** ({} chars)", value.chars().count())
}
