//! Cryptographic primitives for PassVault.
//!
//! This module provides:
//! - Key derivation using PBKDF2-HMAC-SHA256
//! - Authenticated encryption using AES-256-GCM with detached tags
//! - Base64 text encoding of sealed fields and salts
//! - Key types with automatic zeroization
//!
//! # Security Guarantees
//! - Key material is zeroized on drop and never serialized or logged
//! - A fresh IV is generated for every encryption call
//! - Tags are verified before any plaintext is released

pub mod aead;
pub mod codec;
pub mod kdf;
pub mod keys;

pub use aead::{decrypt, encrypt, SealedField};
pub use codec::{decode_field, decode_salt, encode_field, encode_salt, EncodedField};
pub use kdf::{derive_key, KdfParams, MAX_ITERATIONS, MIN_ITERATIONS};
pub use keys::{AuthTag, Iv, Salt, VaultKey, IV_LENGTH, KEY_LENGTH, SALT_LENGTH, TAG_LENGTH};
