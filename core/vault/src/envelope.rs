//! Encrypted vault item envelope and the requests that carry it.
//!
//! Both types reject unknown JSON keys, so a client cannot smuggle server-owned
//! fields such as `ownerId` or `version` into a create or update.

use serde::{Deserialize, Serialize};

use crate::item::FieldName;
use passvault_common::{Error, Result};
use passvault_crypto::{decode_field, decode_salt, EncodedField, MAX_ITERATIONS, MIN_ITERATIONS};

fn default_iterations() -> u32 {
    MIN_ITERATIONS
}

/// A vault item as produced by the client: opaque to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EncryptedItem {
    /// Base64 key-derivation salt.
    pub salt: String,
    /// PBKDF2 iteration count the key was derived with.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    pub title: EncodedField,
    pub username: EncodedField,
    pub password: EncodedField,
    pub url: EncodedField,
    pub notes: EncodedField,
}

impl EncryptedItem {
    /// Get a field by name.
    pub fn field(&self, name: FieldName) -> &EncodedField {
        match name {
            FieldName::Title => &self.title,
            FieldName::Username => &self.username,
            FieldName::Password => &self.password,
            FieldName::Url => &self.url,
            FieldName::Notes => &self.notes,
        }
    }

    /// Check the envelope format without any key.
    ///
    /// # Errors
    /// - Returns `EnvelopeFormat` for bad base64, wrong salt/IV/tag lengths
    ///   or an iteration count outside the accepted range
    pub fn validate(&self) -> Result<()> {
        decode_salt(&self.salt)?;
        if self.iterations < MIN_ITERATIONS {
            return Err(Error::EnvelopeFormat(format!(
                "iterations must be at least {}",
                MIN_ITERATIONS
            )));
        }
        if self.iterations > MAX_ITERATIONS {
            return Err(Error::EnvelopeFormat(format!(
                "iterations must be at most {}",
                MAX_ITERATIONS
            )));
        }
        for name in FieldName::ALL {
            decode_field(self.field(name)).map_err(|e| match e {
                Error::EnvelopeFormat(msg) => Error::EnvelopeFormat(format!("{}: {}", name, msg)),
                other => other,
            })?;
        }
        Ok(())
    }
}

/// Body of an item update: the full re-encrypted item plus the version the
/// client read before editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ItemUpdate {
    /// Version the edit is based on; a mismatch means someone else wrote first.
    pub expected_version: u64,
    pub item: EncryptedItem,
}
