//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! Turns a master password and a salt into a 256-bit `VaultKey`. The
//! iteration count is a floor, not a ceiling: stored items record the count
//! they were derived with so it can be raised later without breaking them.

use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::keys::{Salt, VaultKey, KEY_LENGTH};
use passvault_common::{Error, Result};

/// Minimum accepted PBKDF2 iteration count.
pub const MIN_ITERATIONS: u32 = 100_000;

/// Maximum accepted PBKDF2 iteration count. Bounds the cost of opening an
/// item whose stored count came from untrusted storage.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// Parameters for PBKDF2 key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Number of PBKDF2 iterations.
    pub iterations: u32,
}

impl KdfParams {
    /// Create parameters with an explicit iteration count.
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    /// Check that the parameters are usable.
    ///
    /// # Errors
    /// - Returns `KeyDerivation` for zero iterations or a count outside
    ///   `MIN_ITERATIONS..=MAX_ITERATIONS`
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::KeyDerivation(
                "Iteration count must be non-zero".to_string(),
            ));
        }
        if self.iterations < MIN_ITERATIONS {
            return Err(Error::KeyDerivation(format!(
                "Iteration count {} is below the minimum of {}",
                self.iterations, MIN_ITERATIONS
            )));
        }
        if self.iterations > MAX_ITERATIONS {
            return Err(Error::KeyDerivation(format!(
                "Iteration count {} is above the maximum of {}",
                self.iterations, MAX_ITERATIONS
            )));
        }
        Ok(())
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: MIN_ITERATIONS,
        }
    }
}

/// Derive a vault key from a master password and salt.
///
/// # Preconditions
/// - `password` must not be empty
/// - `params` must pass `KdfParams::validate`
///
/// # Postconditions
/// - Returns a VaultKey derived from the password
/// - The derived key is deterministic given the same inputs
///
/// # Errors
/// - `InvalidInput` if password is empty (checked before anything else runs)
/// - `KeyDerivation` if the parameters are invalid
///
/// # Security
/// - Password is not stored or logged
/// - Intermediate key bytes are zeroized
pub fn derive_key(password: &[u8], salt: &Salt, params: &KdfParams) -> Result<VaultKey> {
    if password.is_empty() {
        return Err(Error::InvalidInput(
            "Master password cannot be empty".to_string(),
        ));
    }

    params.validate()?;

    let mut key_bytes = stretch(password, salt.as_bytes(), params.iterations);
    let key = VaultKey::from_bytes(key_bytes);
    key_bytes.zeroize();

    Ok(key)
}

fn stretch(password: &[u8], salt: &[u8], iterations: u32) -> [u8; KEY_LENGTH] {
    let mut out = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut out);
    out
}
