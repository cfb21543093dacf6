//! Format-preserving rewrite of `KEY=VALUE` config files.
//!
//! This module provides:
//! - Entry parsing and lookup resolution (`entry`)
//! - A line snapshot that renders back byte-for-byte (`document`)
//! - The idempotent encrypt/decrypt passes over a file (`engine`)

pub mod document;
pub mod engine;
pub mod entry;

pub use document::{ConfigDocument, LineEnding, LineUpdate};
pub use engine::{RevealReport, RevealedEntry, RewriteEngine, RewriteReport};
pub use entry::{extract_entries, parse_entry, select_targets, ConfigEntry, Selection};
