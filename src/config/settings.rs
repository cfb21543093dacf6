use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::codec::DEFAULT_CONCURRENCY;
use crate::crypto::kdf::{CryptoParams, DEFAULT_SALT_LEN, IV_LEN, KEY_LEN};
use crate::errors::{EnvSealError, Result};

/// Memory cost below which a warning is logged (8 MB).
const RECOMMENDED_MIN_MEMORY_KIB: u32 = 8_192;

/// Project-level configuration, loaded from `.envseal.toml`.
///
/// Every field has a sensible default so EnvSeal works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Secret store file (relative to the project root).
    #[serde(default = "default_secret_store")]
    pub secret_store: String,

    /// Name of the entry in the secret store holding the passphrase.
    #[serde(default = "default_secret_key_name")]
    pub secret_key_name: String,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Salt length in bytes (default: 16).
    #[serde(default = "default_salt_len")]
    pub salt_len: usize,

    /// Maximum values encrypted/decrypted at once (default: 4).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_secret_store() -> String {
    ".env.secret".to_string()
}

fn default_secret_key_name() -> String {
    "SECRET_KEY".to_string()
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_salt_len() -> usize {
    DEFAULT_SALT_LEN
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            secret_store: default_secret_store(),
            secret_key_name: default_secret_key_name(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            salt_len: default_salt_len(),
            concurrency: default_concurrency(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    pub const FILE_NAME: &'static str = ".envseal.toml";

    /// Load settings from `<project_dir>/.envseal.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .map_err(|e| EnvSealError::file_access(&config_path, e))?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            EnvSealError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if settings.argon2_memory_kib < RECOMMENDED_MIN_MEMORY_KIB {
            tracing::warn!(
                memory_kib = settings.argon2_memory_kib,
                recommended = RECOMMENDED_MIN_MEMORY_KIB,
                "Argon2 memory cost is below the recommended minimum"
            );
        }

        Ok(settings)
    }

    /// Full path to the secret store.
    ///
    /// Example: `project_dir/.env.secret`
    pub fn secret_store_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.secret_store)
    }

    /// Convert the crypto settings into crypto-layer params.
    pub fn crypto_params(&self) -> CryptoParams {
        CryptoParams {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
            key_len: KEY_LEN,
            iv_len: IV_LEN,
            salt_len: self.salt_len,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
