//! In-place encryption of selected config entries.
//!
//! `RewriteEngine::encrypt_file` is idempotent: values already in
//! encrypted form are left alone, so running it twice with the same
//! targets leaves the file byte-identical after the first run.  Lines
//! that are not targeted never change, and the file is written at most
//! once, atomically, after every targeted value has been encrypted.

use std::path::{Path, PathBuf};

use super::document::ConfigDocument;
use super::entry::select_targets;
use crate::crypto::codec::{is_encrypted, FieldCodec, FieldValue};
use crate::errors::{EnvSealError, Result};

/// Outcome of one `encrypt_file` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub path: PathBuf,
    /// Keys that were plaintext and are now encrypted, in file order.
    pub encrypted: Vec<String>,
    /// Targeted keys whose values were already encrypted.
    pub already_encrypted: Vec<String>,
    /// Lookups that matched neither a key nor a value.
    pub unresolved: Vec<String>,
}

impl RewriteReport {
    /// Number of values newly encrypted by this run.
    pub fn newly_encrypted(&self) -> usize {
        self.encrypted.len()
    }

    /// Number of entries the run looked at.
    pub fn targeted(&self) -> usize {
        self.encrypted.len() + self.already_encrypted.len()
    }

    /// `true` when the file was left untouched.
    pub fn is_unchanged(&self) -> bool {
        self.encrypted.is_empty()
    }
}

/// One entry returned by `decrypt_file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealedEntry {
    pub key: String,
    pub value: String,
    /// Whether the stored value was encrypted.
    pub was_encrypted: bool,
}

/// Read-only counterpart of `RewriteReport`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealReport {
    pub entries: Vec<RevealedEntry>,
    pub unresolved: Vec<String>,
}

/// Applies a `FieldCodec` to config files.
#[derive(Debug, Clone, Copy)]
pub struct RewriteEngine {
    codec: FieldCodec,
}

impl RewriteEngine {
    pub fn new(codec: FieldCodec) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &FieldCodec {
        &self.codec
    }

    /// Encrypt the targeted entries of the file at `path` in place.
    ///
    /// `lookups` of `None` targets every entry.  Missing lookups are
    /// logged and reported but do not fail the run.  Any encryption
    /// failure aborts before anything is written.
    pub async fn encrypt_file(
        &self,
        path: &Path,
        lookups: Option<&[String]>,
        secret: &str,
    ) -> Result<RewriteReport> {
        let mut doc = ConfigDocument::load(path).await?;
        let selection = select_targets(&doc.entries(), lookups);

        for lookup in &selection.unresolved {
            tracing::warn!(path = %path.display(), lookup = %lookup, "no entry matches lookup; skipping");
        }

        let pending: Vec<(String, String)> = selection
            .targets
            .iter()
            .map(|e| (e.key.clone(), e.value.clone()))
            .collect();
        let results = self.codec.encrypt_entries_if_needed(pending, secret).await?;

        let mut report = RewriteReport {
            path: path.to_path_buf(),
            unresolved: selection.unresolved,
            ..RewriteReport::default()
        };

        for (entry, result) in selection.targets.into_iter().zip(results) {
            match result {
                FieldValue::Unchanged => {
                    tracing::debug!(key = %entry.key, "already encrypted");
                    report.already_encrypted.push(entry.key);
                }
                FieldValue::Encrypted(params) => {
                    doc.set_line(entry.line, &entry.key, &params.to_json()?);
                    report.encrypted.push(entry.key);
                }
            }
        }

        if report.is_unchanged() {
            tracing::info!(path = %path.display(), "nothing needed encryption");
            return Ok(report);
        }

        doc.save(path).await?;
        tracing::info!(
            path = %path.display(),
            count = report.newly_encrypted(),
            "encrypted values written"
        );

        Ok(report)
    }

    /// Decrypt the targeted entries of the file at `path`.
    ///
    /// The file is not modified.  Targeted plaintext entries are
    /// returned as they are with `was_encrypted == false`.  If any
    /// encrypted entry fails to decrypt, nothing is returned.
    pub async fn decrypt_file(
        &self,
        path: &Path,
        lookups: Option<&[String]>,
        secret: &str,
    ) -> Result<RevealReport> {
        let doc = ConfigDocument::load(path).await?;
        let selection = select_targets(&doc.entries(), lookups);

        for lookup in &selection.unresolved {
            tracing::warn!(path = %path.display(), lookup = %lookup, "no entry matches lookup; skipping");
        }

        let encrypted: Vec<(String, String)> = selection
            .targets
            .iter()
            .filter(|e| is_encrypted(&e.value))
            .map(|e| (e.key.clone(), e.value.clone()))
            .collect();
        let mut plaintexts = self
            .codec
            .decrypt_entries(encrypted, secret)
            .await?
            .into_iter();

        let mut entries = Vec::with_capacity(selection.targets.len());
        for entry in selection.targets {
            let revealed = if is_encrypted(&entry.value) {
                match plaintexts.next() {
                    Some(value) => RevealedEntry {
                        key: entry.key,
                        value,
                        was_encrypted: true,
                    },
                    None => {
                        return Err(EnvSealError::TaskFailed(format!(
                            "no decrypted value for {}",
                            entry.key
                        )));
                    }
                }
            } else {
                RevealedEntry {
                    key: entry.key,
                    value: entry.value,
                    was_encrypted: false,
                }
            };
            entries.push(revealed);
        }

        Ok(RevealReport {
            entries,
            unresolved: selection.unresolved,
        })
    }
}
