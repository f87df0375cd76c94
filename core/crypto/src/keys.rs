//! Key material and the fixed-size values that travel with a ciphertext.
//!
//! `VaultKey` zeroizes its memory on drop. Salts, IVs and tags are public
//! values and are plain byte arrays.

use rand::{rngs::OsRng, RngCore};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use passvault_common::{Error, Result};

/// Length of encryption keys in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Length of key-derivation salts in bytes (128-bit).
pub const SALT_LENGTH: usize = 16;

/// Length of AES-GCM initialization vectors in bytes (96-bit).
pub const IV_LENGTH: usize = 12;

/// Length of AES-GCM authentication tags in bytes (128-bit).
pub const TAG_LENGTH: usize = 16;

/// Symmetric key derived from a master password.
///
/// Lives only for the duration of one encrypt or decrypt call. It is never
/// serialized, and its `Debug` output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct VaultKey {
    key: [u8; KEY_LENGTH],
}

impl VaultKey {
    /// Create a key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl PartialEq for VaultKey {
    fn eq(&self, other: &Self) -> bool {
        self.key.ct_eq(&other.key).into()
    }
}

impl Eq for VaultKey {}

impl fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VaultKey([REDACTED])")
    }
}

/// Salt for key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LENGTH]);

impl Salt {
    /// Generate a random salt from the OS RNG.
    pub fn generate() -> Self {
        let mut salt = [0u8; SALT_LENGTH];
        OsRng.fill_bytes(&mut salt);
        Self(salt)
    }

    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; SALT_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking its length.
    ///
    /// # Errors
    /// - Returns `EnvelopeFormat` if the slice is not `SALT_LENGTH` bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        fixed::<SALT_LENGTH>("salt", bytes).map(Self)
    }

    /// Get the salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_LENGTH] {
        &self.0
    }
}

/// AES-GCM initialization vector.
///
/// Must never be reused with the same key; `generate` draws a fresh one
/// for every encryption call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Iv([u8; IV_LENGTH]);

impl Iv {
    /// Generate a random IV from the OS RNG.
    pub fn generate() -> Self {
        let mut iv = [0u8; IV_LENGTH];
        OsRng.fill_bytes(&mut iv);
        Self(iv)
    }

    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; IV_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking its length.
    ///
    /// # Errors
    /// - Returns `EnvelopeFormat` if the slice is not `IV_LENGTH` bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        fixed::<IV_LENGTH>("iv", bytes).map(Self)
    }

    /// Get the IV bytes.
    pub fn as_bytes(&self) -> &[u8; IV_LENGTH] {
        &self.0
    }
}

/// AES-GCM authentication tag as returned by the cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthTag([u8; TAG_LENGTH]);

impl AuthTag {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; TAG_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking its length.
    ///
    /// # Errors
    /// - Returns `EnvelopeFormat` if the slice is not `TAG_LENGTH` bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        fixed::<TAG_LENGTH>("authTag", bytes).map(Self)
    }

    /// Get the tag bytes.
    pub fn as_bytes(&self) -> &[u8; TAG_LENGTH] {
        &self.0
    }
}

fn fixed<const N: usize>(what: &str, bytes: &[u8]) -> Result<[u8; N]> {
    bytes.try_into().map_err(|_| {
        Error::EnvelopeFormat(format!(
            "{} must be {} bytes, got {}",
            what,
            N,
            bytes.len()
        ))
    })
}
