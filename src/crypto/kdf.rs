//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that protects against brute-force and
//! GPU-based attacks.  Cost parameters come from `CryptoParams`
//! (loaded from `.envseal.toml` or the defaults below) and are never
//! computed at runtime.
//!
//! The derived bytes are imported straight into a `CipherKey`, which
//! can only seal and open AES-256-GCM payloads.  The raw bytes are
//! zeroized as soon as the cipher has been keyed.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

use crate::errors::{EnvSealError, Result};

/// Key size of AES-256 in bytes.
pub const KEY_LEN: usize = 32;

/// AES-GCM standard nonce size in bytes.
pub const IV_LEN: usize = 12;

/// Default salt length in bytes (128 bits).
pub const DEFAULT_SALT_LEN: usize = 16;

/// Argon2 refuses salts shorter than this.
pub const MIN_SALT_LEN: usize = 8;

/// Argon2 needs at least this much memory per lane, in KiB.
const MIN_MEMORY_KIB_PER_LANE: u32 = 8;

/// Tunable parameters for the KDF and cipher.
///
/// Passed into every derive/encrypt/decrypt call so tests can use cheap
/// costs without touching any global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CryptoParams {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
    /// Derived key length in bytes. Only 32 (AES-256) is supported.
    pub key_len: usize,
    /// IV length in bytes. Only 12 (the GCM standard nonce) is supported.
    pub iv_len: usize,
    /// Salt length in bytes (at least 8).
    pub salt_len: usize,
}

impl Default for CryptoParams {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
            key_len: KEY_LEN,
            iv_len: IV_LEN,
            salt_len: DEFAULT_SALT_LEN,
        }
    }
}

impl CryptoParams {
    /// Check that every field is usable before any work is done.
    pub fn validate(&self) -> Result<()> {
        if self.memory_kib == 0 {
            return Err(EnvSealError::InvalidParameter(
                "Argon2 memory cost must be positive".into(),
            ));
        }
        if self.iterations == 0 {
            return Err(EnvSealError::InvalidParameter(
                "Argon2 iterations must be at least 1".into(),
            ));
        }
        if self.parallelism == 0 {
            return Err(EnvSealError::InvalidParameter(
                "Argon2 parallelism must be at least 1".into(),
            ));
        }
        if self.memory_kib < self.parallelism.saturating_mul(MIN_MEMORY_KIB_PER_LANE) {
            return Err(EnvSealError::InvalidParameter(format!(
                "Argon2 memory cost must be at least {MIN_MEMORY_KIB_PER_LANE} KiB per lane \
                 ({} KiB for parallelism {}, got {})",
                self.parallelism.saturating_mul(MIN_MEMORY_KIB_PER_LANE),
                self.parallelism,
                self.memory_kib
            )));
        }
        if self.key_len != KEY_LEN {
            return Err(EnvSealError::InvalidParameter(format!(
                "key length must be {KEY_LEN} bytes for AES-256-GCM (got {})",
                self.key_len
            )));
        }
        if self.iv_len != IV_LEN {
            return Err(EnvSealError::InvalidParameter(format!(
                "IV length must be {IV_LEN} bytes for AES-GCM (got {})",
                self.iv_len
            )));
        }
        if self.salt_len < MIN_SALT_LEN {
            return Err(EnvSealError::InvalidParameter(format!(
                "salt length must be at least {MIN_SALT_LEN} bytes (got {})",
                self.salt_len
            )));
        }
        Ok(())
    }
}

/// An AES-256-GCM key handle.
///
/// Only exposes `seal` and `open`; the key bytes cannot be read back.
pub struct CipherKey {
    cipher: Aes256Gcm,
}

impl CipherKey {
    /// Import raw key bytes. The caller keeps ownership of `raw` and is
    /// responsible for wiping it.
    fn import(raw: &[u8]) -> Result<Self> {
        let cipher = Aes256Gcm::new_from_slice(raw)
            .map_err(|e| EnvSealError::DerivationFailed(format!("key import failed: {e}")))?;
        Ok(Self { cipher })
    }

    /// Encrypt and authenticate `plaintext` under `iv`.
    ///
    /// Returns ciphertext with the 16-byte tag appended.
    pub fn seal(&self, iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        if iv.len() != IV_LEN {
            return Err(EnvSealError::InvalidParameter(format!(
                "IV must be {IV_LEN} bytes (got {})",
                iv.len()
            )));
        }
        self.cipher
            .encrypt(Nonce::from_slice(iv), plaintext)
            .map_err(|e| EnvSealError::EncryptionFailed(format!("AES-GCM error: {e}")))
    }

    /// Decrypt and verify `ciphertext` (tag included) under `iv`.
    ///
    /// Any mismatch, including an IV of the wrong size, is reported as
    /// `DecryptionFailed`.
    pub fn open(&self, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        if iv.len() != IV_LEN {
            return Err(EnvSealError::DecryptionFailed);
        }
        self.cipher
            .decrypt(Nonce::from_slice(iv), ciphertext)
            .map_err(|_| EnvSealError::DecryptionFailed)
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CipherKey(..)")
    }
}

/// Derive a `CipherKey` from a secret and salt using Argon2id.
///
/// The same secret + salt + params always produce the same key.
pub fn derive_key(secret: &[u8], salt: &[u8], params: &CryptoParams) -> Result<CipherKey> {
    params.validate()?;

    let argon2_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(params.key_len),
    )
    .map_err(|e| EnvSealError::InvalidParameter(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut raw = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(secret, salt, &mut raw[..])
        .map_err(|e| EnvSealError::DerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    CipherKey::import(&raw[..])
}
