use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in EnvSeal.
///
/// Messages never include secret material: no passphrases, derived keys,
/// or plaintext values.
#[derive(Debug, Error)]
pub enum EnvSealError {
    // --- Parameter errors ---
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    // --- Crypto errors ---
    #[error("Secure random generation failed: {0}")]
    RandomnessUnavailable(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Malformed encrypted value: {0}")]
    MalformedCiphertext(String),

    #[error("Decryption failed: wrong secret or tampered data")]
    DecryptionFailed,

    // --- IO errors ---
    #[error("Cannot access {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- Runtime errors ---
    #[error("Background task failed: {0}")]
    TaskFailed(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// Wraps another error with the entry (key name or batch position)
    /// that was being processed when it happened.
    #[error("{operation} failed for {target}: {source}")]
    Entry {
        operation: &'static str,
        target: String,
        #[source]
        source: Box<EnvSealError>,
    },
}

/// The closed set of failure categories callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidParameter,
    RandomnessUnavailable,
    DerivationFailed,
    EncryptionFailed,
    MalformedCiphertext,
    DecryptionFailed,
    FileAccess,
    Config,
    Task,
    Command,
}

impl EnvSealError {
    /// Category of this error, looking through any `Entry` context.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::RandomnessUnavailable(_) => ErrorKind::RandomnessUnavailable,
            Self::DerivationFailed(_) => ErrorKind::DerivationFailed,
            Self::EncryptionFailed(_) => ErrorKind::EncryptionFailed,
            Self::MalformedCiphertext(_) => ErrorKind::MalformedCiphertext,
            Self::DecryptionFailed => ErrorKind::DecryptionFailed,
            Self::FileAccess { .. } => ErrorKind::FileAccess,
            Self::ConfigError(_) => ErrorKind::Config,
            Self::TaskFailed(_) => ErrorKind::Task,
            Self::CommandFailed(_) => ErrorKind::Command,
            Self::Entry { source, .. } => source.kind(),
        }
    }

    /// Attach the operation name and target (key or batch position).
    pub fn for_entry(self, operation: &'static str, target: impl Into<String>) -> Self {
        Self::Entry {
            operation,
            target: target.into(),
            source: Box::new(self),
        }
    }

    /// Build a `FileAccess` error for `path`.
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }
}

/// Convenience type alias for EnvSeal results.
pub type Result<T> = std::result::Result<T, EnvSealError>;
