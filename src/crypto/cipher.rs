//! AES-256-GCM encryption of single configuration values.
//!
//! Every call to `encrypt` draws a fresh salt and IV, derives a key
//! with Argon2id, and returns the three pieces base64-encoded:
//!
//! ```text
//! {"salt":"<b64>","iv":"<b64>","cipherText":"<b64 ciphertext + tag>"}
//! ```
//!
//! The JSON text is what ends up in the config file.  There is no
//! version or algorithm field; both are fixed by `CryptoParams`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::kdf::{derive_key, CryptoParams, MIN_SALT_LEN};
use super::random::{generate_iv, generate_salt};
use crate::errors::{EnvSealError, Result};

/// The stored form of an encrypted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionParameters {
    pub salt: String,
    pub iv: String,
    pub cipher_text: String,
}

/// Lenient mirror of `EncryptionParameters` so a missing field can be
/// reported by name instead of as a generic serde error.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParameters {
    salt: Option<String>,
    iv: Option<String>,
    cipher_text: Option<String>,
}

impl EncryptionParameters {
    /// Parse and validate the JSON form.
    ///
    /// All three fields must be present, strings, and non-empty.
    pub fn from_json(serialized: &str) -> Result<Self> {
        let raw: RawParameters = serde_json::from_str(serialized.trim())
            .map_err(|e| EnvSealError::MalformedCiphertext(format!("invalid JSON: {e}")))?;

        Ok(Self {
            salt: require("salt", raw.salt)?,
            iv: require("iv", raw.iv)?,
            cipher_text: require("cipherText", raw.cipher_text)?,
        })
    }

    /// Serialize to the compact JSON stored in config files.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            EnvSealError::EncryptionFailed(format!("cannot serialize parameters: {e}"))
        })
    }
}

fn require(field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        Some(_) => Err(EnvSealError::MalformedCiphertext(format!(
            "field '{field}' is empty"
        ))),
        None => Err(EnvSealError::MalformedCiphertext(format!(
            "missing field '{field}'"
        ))),
    }
}

/// Stateless AES-256-GCM cipher bound to a set of `CryptoParams`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cipher {
    params: CryptoParams,
}

impl Cipher {
    /// Create a cipher, rejecting unusable parameters up front.
    pub fn new(params: CryptoParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// The parameters this cipher derives keys with.
    pub fn params(&self) -> &CryptoParams {
        &self.params
    }

    /// Encrypt `plaintext` under a key derived from `secret`.
    ///
    /// Two calls with the same arguments return different parameters
    /// because the salt and IV are always fresh.
    pub fn encrypt(&self, plaintext: &str, secret: &str) -> Result<EncryptionParameters> {
        let salt = generate_salt(&self.params)?;
        let iv = generate_iv(&self.params)?;

        let key = derive_key(secret.as_bytes(), &salt, &self.params)?;
        let ciphertext = key.seal(&iv, plaintext.as_bytes())?;

        Ok(EncryptionParameters {
            salt: BASE64.encode(&salt),
            iv: BASE64.encode(&iv),
            cipher_text: BASE64.encode(&ciphertext),
        })
    }

    /// Parse the JSON form and decrypt it.
    pub fn decrypt(&self, serialized: &str, secret: &str) -> Result<String> {
        let params = EncryptionParameters::from_json(serialized)?;
        self.decrypt_parameters(&params, secret)
    }

    /// Decrypt already-parsed parameters.
    ///
    /// A field that is no longer valid base64 has been tampered with,
    /// so it fails the same way as a bad authentication tag.
    pub fn decrypt_parameters(&self, params: &EncryptionParameters, secret: &str) -> Result<String> {
        let salt = decode_field(&params.salt)?;
        let iv = decode_field(&params.iv)?;
        let ciphertext = decode_field(&params.cipher_text)?;
        // A salt Argon2 would refuse can only come from tampering.
        if salt.len() < MIN_SALT_LEN {
            return Err(EnvSealError::DecryptionFailed);
        }

        let key = derive_key(secret.as_bytes(), &salt, &self.params)?;
        let plaintext = key.open(&iv, &ciphertext)?;

        String::from_utf8(plaintext).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            EnvSealError::DecryptionFailed
        })
    }
}

fn decode_field(value: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(value)
        .map_err(|_| EnvSealError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn cipher() -> Cipher {
        Cipher::new(CryptoParams {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
            ..CryptoParams::default()
        })
        .unwrap()
    }

    #[test]
    fn json_uses_camel_case_field_order() {
        let params = EncryptionParameters {
            salt: "a".into(),
            iv: "b".into(),
            cipher_text: "c".into(),
        };
        assert_eq!(
            params.to_json().unwrap(),
            r#"{"salt":"a","iv":"b","cipherText":"c"}"#
        );
    }

    #[test]
    fn from_json_reports_missing_field() {
        let err = EncryptionParameters::from_json(r#"{"salt":"a","iv":"b"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedCiphertext);
        assert!(err.to_string().contains("cipherText"));
    }

    #[test]
    fn from_json_rejects_empty_field() {
        let err =
            EncryptionParameters::from_json(r#"{"salt":"","iv":"b","cipherText":"c"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedCiphertext);
    }

    #[test]
    fn from_json_rejects_non_json() {
        let err = EncryptionParameters::from_json("hunter2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedCiphertext);
    }

    #[test]
    fn roundtrip_including_empty_plaintext() {
        let c = cipher();
        for value in ["secret123", "", "päss=wörd with spaces"] {
            let json = c.encrypt(value, "k1").unwrap().to_json().unwrap();
            assert_eq!(c.decrypt(&json, "k1").unwrap(), value);
        }
    }

    #[test]
    fn empty_secret_is_accepted() {
        let c = cipher();
        let params = c.encrypt("value", "").unwrap();
        assert_eq!(c.decrypt_parameters(&params, "").unwrap(), "value");
    }

    #[test]
    fn wrong_secret_fails() {
        let c = cipher();
        let params = c.encrypt("value", "right").unwrap();
        let err = c.decrypt_parameters(&params, "wrong").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecryptionFailed);
    }

    #[test]
    fn invalid_base64_is_treated_as_tampering() {
        let c = cipher();
        let mut params = c.encrypt("value", "k").unwrap();
        params.iv = "!!!not-base64!!!".into();
        let err = c.decrypt_parameters(&params, "k").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecryptionFailed);
    }

    #[test]
    fn new_rejects_bad_params() {
        let err = Cipher::new(CryptoParams {
            iterations: 0,
            ..CryptoParams::default()
        })
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }
}
