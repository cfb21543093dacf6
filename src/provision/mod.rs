//! Secret store provisioning.
//!
//! The secret store is a `KEY=VALUE` file holding the passphrases that
//! config values are encrypted with.  Entries are only ever appended:
//! once a secret exists it is never overwritten, so re-running
//! provisioning cannot silently rotate a key that encrypted data
//! depends on.

use std::path::Path;

use regex::Regex;
use zeroize::Zeroizing;

use crate::crypto::random::generate_secret_key;
use crate::errors::{EnvSealError, Result};
use crate::files;
use crate::rewrite::ConfigDocument;

/// What `generate_and_store` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A new secret was generated and appended to the store.
    Created,
    /// The store already had an entry for the key; nothing changed.
    AlreadyPresent,
}

/// Generate a fresh secret and append it to the store as `key_name`.
///
/// Does nothing if the store already defines `key_name`.  A missing
/// store file is created.
pub async fn generate_and_store(store: &Path, key_name: &str) -> Result<ProvisionOutcome> {
    validate_key_name(key_name)?;
    let secret = Zeroizing::new(generate_secret_key()?);
    store_secret(store, key_name, &secret).await
}

/// Append `key_name=value` to the store unless `key_name` is present.
pub async fn store_secret(store: &Path, key_name: &str, value: &str) -> Result<ProvisionOutcome> {
    validate_key_name(key_name)?;

    let existing = if files::exists(store).await {
        files::read_text(store).await?
    } else {
        String::new()
    };

    if key_pattern(key_name)?.is_match(&existing) {
        tracing::info!(store = %store.display(), key = key_name, "secret already present; leaving it untouched");
        return Ok(ProvisionOutcome::AlreadyPresent);
    }

    let mut doc = ConfigDocument::parse(&existing);
    doc.set(key_name, value);
    files::write_atomic(store, &doc.render()).await?;

    tracing::info!(store = %store.display(), key = key_name, "secret stored");
    Ok(ProvisionOutcome::Created)
}

/// Look up `key_name` in the store.
///
/// Returns `None` if the store does not exist or has no such entry.
pub async fn read_secret(store: &Path, key_name: &str) -> Result<Option<Zeroizing<String>>> {
    if !files::exists(store).await {
        return Ok(None);
    }

    let doc = ConfigDocument::load(store).await?;
    Ok(doc
        .entries()
        .into_iter()
        .find(|e| e.key == key_name)
        .map(|e| Zeroizing::new(e.value)))
}

/// `^KEY=` anchored at any line start.
fn key_pattern(key_name: &str) -> Result<Regex> {
    Regex::new(&format!("(?m)^{}=", regex::escape(key_name)))
        .map_err(|e| EnvSealError::InvalidParameter(format!("bad key name pattern: {e}")))
}

/// Allowed: ASCII letters, digits, underscores, hyphens, periods.
/// Must be non-empty and at most 256 characters.
fn validate_key_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(EnvSealError::InvalidParameter(
            "secret key name cannot be empty".into(),
        ));
    }
    if name.len() > 256 {
        return Err(EnvSealError::InvalidParameter(
            "secret key name cannot exceed 256 characters".into(),
        ));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
    {
        return Err(EnvSealError::InvalidParameter(format!(
            "secret key name '{name}' contains invalid characters; only ASCII letters, digits, underscores, hyphens, and periods are allowed"
        )));
    }
    Ok(())
}
