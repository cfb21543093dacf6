//! Cryptographic primitives for EnvSeal.
//!
//! This module provides:
//! - OS-backed random salts, IVs and secret keys (`random`)
//! - Argon2id key derivation into an AES-256-GCM key handle (`kdf`)
//! - Value encryption/decryption and the stored JSON format (`cipher`)
//! - Encrypted-value detection and concurrent batches (`codec`)

pub mod cipher;
pub mod codec;
pub mod kdf;
pub mod random;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{Cipher, FieldCodec, CryptoParams, ...};
pub use cipher::{Cipher, EncryptionParameters};
pub use codec::{is_encrypted, FieldCodec, FieldValue};
pub use kdf::{derive_key, CipherKey, CryptoParams};
pub use random::{generate_secret_key, random_bytes, random_encoded, Encoding};
