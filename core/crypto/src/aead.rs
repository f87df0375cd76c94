//! Authenticated encryption using AES-256-GCM.
//!
//! Every call to [`encrypt`] draws a fresh 96-bit IV, so two fields sealed
//! under the same key never share one. The 128-bit tag is kept detached
//! from the ciphertext and is exactly the tag the cipher produced.

use aes_gcm::{
    aead::{generic_array::GenericArray, AeadInPlace, KeyInit},
    Aes256Gcm,
};
use zeroize::{Zeroize, Zeroizing};

use crate::keys::{AuthTag, Iv, VaultKey, TAG_LENGTH};
use passvault_common::{Error, Result};

/// Output of one encryption call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedField {
    /// Ciphertext without the tag; same length as the plaintext.
    pub ciphertext: Vec<u8>,
    /// IV used for this call only.
    pub iv: Iv,
    /// GCM authentication tag over `ciphertext` and the associated data.
    pub tag: AuthTag,
}

/// Encrypt plaintext under `key` with a freshly generated IV.
///
/// `aad` is authenticated but not encrypted; the same bytes must be supplied
/// to [`decrypt`].
///
/// # Postconditions
/// - `ciphertext.len() == plaintext.len()`
/// - The IV is randomly generated
///
/// # Errors
/// - Returns `Crypto` if the cipher rejects the input (length limits)
pub fn encrypt(key: &VaultKey, plaintext: &[u8], aad: &[u8]) -> Result<SealedField> {
    seal_with_iv(key, Iv::generate(), plaintext, aad)
}

/// Decrypt a sealed field, verifying the tag first.
///
/// No plaintext is released unless the tag matches.
///
/// # Errors
/// - Returns `Integrity` on any tag mismatch: wrong key, altered ciphertext,
///   IV, tag or associated data all look the same to the caller
pub fn decrypt(key: &VaultKey, sealed: &SealedField, aad: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let cipher = cipher_for(key)?;

    let mut buffer = sealed.ciphertext.clone();
    let verified = cipher.decrypt_in_place_detached(
        GenericArray::from_slice(sealed.iv.as_bytes()),
        aad,
        &mut buffer,
        GenericArray::from_slice(sealed.tag.as_bytes()),
    );

    match verified {
        Ok(()) => Ok(Zeroizing::new(buffer)),
        Err(_) => {
            buffer.zeroize();
            Err(Error::Integrity)
        }
    }
}

/// Encrypt with a caller-chosen IV.
///
/// # Warning
/// Reusing an IV with the same key destroys both confidentiality and
/// authenticity. Only [`encrypt`] and known-answer tests call this.
fn seal_with_iv(key: &VaultKey, iv: Iv, plaintext: &[u8], aad: &[u8]) -> Result<SealedField> {
    let cipher = cipher_for(key)?;

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(iv.as_bytes()), aad, &mut buffer)
        .map_err(|e| Error::Crypto(format!("Encryption failed: {}", e)))?;

    let mut tag_bytes = [0u8; TAG_LENGTH];
    tag_bytes.copy_from_slice(tag.as_slice());

    Ok(SealedField {
        ciphertext: buffer,
        iv,
        tag: AuthTag::from_bytes(tag_bytes),
    })
}

fn cipher_for(key: &VaultKey) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| Error::Crypto(format!("Invalid key: {}", e)))
}
