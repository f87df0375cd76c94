//! Text encoding of sealed fields for transport and storage.
//!
//! All binary values use standard base64 (RFC 4648) with padding. Decoding
//! checks lengths so a malformed envelope is reported as such instead of
//! surfacing later as an authentication failure.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::aead::SealedField;
use crate::keys::{AuthTag, Iv, Salt};
use passvault_common::{Error, Result};

/// A sealed field as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EncodedField {
    /// Base64 ciphertext.
    pub ciphertext: String,
    /// Base64 12-byte IV.
    pub iv: String,
    /// Base64 16-byte GCM tag.
    pub auth_tag: String,
}

/// Encode a sealed field as base64 text.
pub fn encode_field(sealed: &SealedField) -> EncodedField {
    EncodedField {
        ciphertext: STANDARD.encode(&sealed.ciphertext),
        iv: STANDARD.encode(sealed.iv.as_bytes()),
        auth_tag: STANDARD.encode(sealed.tag.as_bytes()),
    }
}

/// Decode a sealed field from base64 text.
///
/// # Errors
/// - Returns `EnvelopeFormat` for malformed base64 or a wrong-length IV or tag
pub fn decode_field(encoded: &EncodedField) -> Result<SealedField> {
    let ciphertext = decode_bytes("ciphertext", &encoded.ciphertext)?;
    let iv = Iv::from_slice(&decode_bytes("iv", &encoded.iv)?)?;
    let tag = AuthTag::from_slice(&decode_bytes("authTag", &encoded.auth_tag)?)?;

    Ok(SealedField {
        ciphertext,
        iv,
        tag,
    })
}

/// Encode a salt as base64 text.
pub fn encode_salt(salt: &Salt) -> String {
    STANDARD.encode(salt.as_bytes())
}

/// Decode a salt from base64 text.
///
/// # Errors
/// - Returns `EnvelopeFormat` for malformed base64 or a salt that is not 16 bytes
pub fn decode_salt(text: &str) -> Result<Salt> {
    Salt::from_slice(&decode_bytes("salt", text)?)
}

fn decode_bytes(what: &str, text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text)
        .map_err(|e| Error::EnvelopeFormat(format!("{} is not valid base64: {}", what, e)))
}
