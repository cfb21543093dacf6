//! Field-level helpers on top of `Cipher`.
//!
//! Decides whether a config value is already in encrypted form, and
//! runs batches of encryptions/decryptions concurrently.  Key
//! derivation is CPU-bound, so each item runs on tokio's blocking
//! pool; at most `concurrency` items are in flight at once and results
//! come back in input order.

use std::sync::Arc;

use futures::{stream, StreamExt, TryStreamExt};
use tokio::task;
use zeroize::Zeroizing;

use super::cipher::{Cipher, EncryptionParameters};
use crate::errors::{EnvSealError, Result};

/// JSON keys that mark a value as encrypted.
const REQUIRED_FIELDS: [&str; 3] = ["salt", "iv", "cipherText"];

/// Default number of concurrent batch items.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Outcome of `encrypt_if_needed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// The value was already encrypted and is left as it is.
    Unchanged,
    /// The value was plaintext and has been encrypted.
    Encrypted(EncryptionParameters),
}

/// Structural check for the encrypted wrapper.
///
/// True when the trimmed value is a JSON object with `salt`, `iv` and
/// `cipherText` keys.  The field contents are not checked here; that
/// happens on decrypt.  Never fails: anything that does not parse is
/// simply plaintext.
pub fn is_encrypted(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.starts_with('{') || !trimmed.ends_with('}') {
        return false;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => {
            REQUIRED_FIELDS.iter().all(|field| map.contains_key(*field))
        }
        Ok(_) => false,
        Err(e) => {
            tracing::debug!(error = %e, "brace-delimited value is not JSON; treating as plaintext");
            false
        }
    }
}

/// Batch-capable wrapper around a `Cipher`.
#[derive(Debug, Clone, Copy)]
pub struct FieldCodec {
    cipher: Cipher,
    concurrency: usize,
}

impl FieldCodec {
    /// `concurrency` is clamped to at least 1.
    pub fn new(cipher: Cipher, concurrency: usize) -> Self {
        Self {
            cipher,
            concurrency: concurrency.max(1),
        }
    }

    pub fn cipher(&self) -> &Cipher {
        &self.cipher
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Encrypt `value` unless it is already encrypted.
    pub fn encrypt_if_needed(&self, value: &str, secret: &str) -> Result<FieldValue> {
        if is_encrypted(value) {
            return Ok(FieldValue::Unchanged);
        }
        self.cipher.encrypt(value, secret).map(FieldValue::Encrypted)
    }

    /// Encrypt every value concurrently, preserving order.
    ///
    /// Values are encrypted as given; use `encrypt_entries_if_needed`
    /// to skip values that are already encrypted.  The first failure
    /// aborts the batch.
    pub async fn encrypt_many(
        &self,
        values: Vec<String>,
        secret: &str,
    ) -> Result<Vec<EncryptionParameters>> {
        self.run_batch("encrypt", by_position(values), secret, |codec, value, secret| {
            codec.cipher.encrypt(&value, secret)
        })
        .await
    }

    /// Decrypt every serialized value concurrently, preserving order.
    ///
    /// All-or-nothing: if any item fails, the error names its position
    /// and no plaintext is returned.
    pub async fn decrypt_many(&self, serialized: Vec<String>, secret: &str) -> Result<Vec<String>> {
        self.run_batch("decrypt", by_position(serialized), secret, |codec, value, secret| {
            codec.cipher.decrypt(&value, secret)
        })
        .await
    }

    /// `encrypt_if_needed` over `(key, value)` pairs, concurrently.
    ///
    /// Errors name the failing key instead of its position.
    pub async fn encrypt_entries_if_needed(
        &self,
        entries: Vec<(String, String)>,
        secret: &str,
    ) -> Result<Vec<FieldValue>> {
        self.run_batch("encrypt", entries, secret, |codec, value, secret| {
            codec.encrypt_if_needed(&value, secret)
        })
        .await
    }

    /// Decrypt `(key, serialized)` pairs concurrently; errors name the key.
    pub async fn decrypt_entries(
        &self,
        entries: Vec<(String, String)>,
        secret: &str,
    ) -> Result<Vec<String>> {
        self.run_batch("decrypt", entries, secret, |codec, value, secret| {
            codec.cipher.decrypt(&value, secret)
        })
        .await
    }

    /// Run `work` for each labelled item on the blocking pool with at
    /// most `self.concurrency` in flight.  Output order matches input.
    async fn run_batch<T, R, F>(
        &self,
        operation: &'static str,
        items: Vec<(String, T)>,
        secret: &str,
        work: F,
    ) -> Result<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(&FieldCodec, T, &str) -> Result<R> + Copy + Send + 'static,
    {
        let secret = Arc::new(Zeroizing::new(secret.to_owned()));
        let codec = *self;

        tracing::debug!(
            operation,
            items = items.len(),
            concurrency = self.concurrency,
            "starting batch"
        );

        stream::iter(items)
            .map(|(label, item)| {
                let secret = Arc::clone(&secret);
                async move {
                    let joined =
                        task::spawn_blocking(move || work(&codec, item, secret.as_str())).await;
                    match joined {
                        Ok(result) => result.map_err(|e| e.for_entry(operation, label)),
                        Err(e) => Err(EnvSealError::TaskFailed(e.to_string())),
                    }
                }
            })
            .buffered(self.concurrency)
            .try_collect()
            .await
    }
}

fn by_position<T>(items: Vec<T>) -> Vec<(String, T)> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| (format!("input #{index}"), item))
        .collect()
}
