//! Secure random bytes for salts, IVs and raw secret keys.
//!
//! Everything here reads from the operating system's CSPRNG via
//! `rand::rngs::OsRng`.  There is no fallback generator: if the OS
//! source fails, the error is surfaced immediately.

use base64::engine::general_purpose::{STANDARD as BASE64, URL_SAFE_NO_PAD as BASE64_URL};
use base64::Engine;
use rand::rngs::OsRng;
use rand::TryRngCore;

use super::kdf::CryptoParams;
use crate::errors::{EnvSealError, Result};

/// Default length of a generated secret key in bytes (256 bits).
pub const DEFAULT_SECRET_KEY_LEN: usize = 32;

/// Text encodings available for random output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Standard base64 with padding (the storage format for salts and IVs).
    #[default]
    Base64,
    /// URL-safe base64 without padding; safe to paste into shells and URLs.
    Base64Url,
}

impl Encoding {
    /// Encode `bytes` with this encoding.
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Self::Base64 => BASE64.encode(bytes),
            Self::Base64Url => BASE64_URL.encode(bytes),
        }
    }
}

/// Fill a fresh buffer of `length` bytes from the OS generator.
///
/// `length` must be at least 1.
pub fn random_bytes(length: usize) -> Result<Vec<u8>> {
    if length == 0 {
        return Err(EnvSealError::InvalidParameter(
            "random length must be at least 1 byte".into(),
        ));
    }

    let mut buf = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| EnvSealError::RandomnessUnavailable(e.to_string()))?;
    Ok(buf)
}

/// Generate `length` random bytes and return them encoded.
pub fn random_encoded(length: usize, encoding: Encoding) -> Result<String> {
    let bytes = random_bytes(length)?;
    Ok(encoding.encode(&bytes))
}

/// Generate a fresh salt sized by `params.salt_len`.
pub fn generate_salt(params: &CryptoParams) -> Result<Vec<u8>> {
    random_bytes(params.salt_len)
}

/// Generate a fresh IV sized by `params.iv_len`.
pub fn generate_iv(params: &CryptoParams) -> Result<Vec<u8>> {
    random_bytes(params.iv_len)
}

/// Generate a new secret key suitable for the secret store.
///
/// 32 random bytes, URL-safe base64 so the value never contains `=`.
pub fn generate_secret_key() -> Result<String> {
    random_encoded(DEFAULT_SECRET_KEY_LEN, Encoding::Base64Url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn zero_length_is_rejected() {
        let err = random_bytes(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn returns_requested_length() {
        assert_eq!(random_bytes(1).unwrap().len(), 1);
        assert_eq!(random_bytes(12).unwrap().len(), 12);
        assert_eq!(random_bytes(64).unwrap().len(), 64);
    }

    #[test]
    fn consecutive_calls_differ() {
        let a = random_bytes(32).unwrap();
        let b = random_bytes(32).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn base64_encoding_decodes_back_to_length() {
        let encoded = random_encoded(16, Encoding::Base64).unwrap();
        assert_eq!(BASE64.decode(encoded).unwrap().len(), 16);
    }

    #[test]
    fn secret_key_has_no_padding_or_equals() {
        let key = generate_secret_key().unwrap();
        assert!(!key.contains('='));
        assert_eq!(BASE64_URL.decode(&key).unwrap().len(), DEFAULT_SECRET_KEY_LEN);
    }

    #[test]
    fn salt_and_iv_follow_params() {
        let params = CryptoParams {
            salt_len: 24,
            ..CryptoParams::default()
        };
        assert_eq!(generate_salt(&params).unwrap().len(), 24);
        assert_eq!(generate_iv(&params).unwrap().len(), params.iv_len);
    }
}
