//! Plaintext vault item fields.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use passvault_common::{Error, Result};

/// One of the sensitive fields of a vault item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    Title,
    Username,
    Password,
    Url,
    Notes,
}

impl FieldName {
    /// Every field, in envelope order.
    pub const ALL: [FieldName; 5] = [
        FieldName::Title,
        FieldName::Username,
        FieldName::Password,
        FieldName::Url,
        FieldName::Notes,
    ];

    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Title => "title",
            FieldName::Username => "username",
            FieldName::Password => "password",
            FieldName::Url => "url",
            FieldName::Notes => "notes",
        }
    }

    /// Whether the field must be non-empty before encryption.
    pub fn is_required(&self) -> bool {
        matches!(self, FieldName::Title | FieldName::Password)
    }

    /// Associated data bound to this field's ciphertext.
    ///
    /// A ciphertext moved into another field's slot fails authentication.
    pub(crate) fn associated_data(&self) -> &'static [u8] {
        self.as_str().as_bytes()
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decrypted contents of a vault item.
///
/// Zeroized on drop; `Debug` never prints values.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PlainFields {
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: String,
}

impl PlainFields {
    /// Create fields with the two required values set.
    pub fn new(title: impl Into<String>, password: impl Into<String>) -> Self {
        let mut fields = Self::default();
        fields.title = title.into();
        fields.password = password.into();
        fields
    }

    /// Set the username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Set the URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Get a field by name.
    pub fn get(&self, field: FieldName) -> &str {
        match field {
            FieldName::Title => &self.title,
            FieldName::Username => &self.username,
            FieldName::Password => &self.password,
            FieldName::Url => &self.url,
            FieldName::Notes => &self.notes,
        }
    }

    /// Replace a field by name; the previous value is zeroized.
    pub fn set(&mut self, field: FieldName, value: String) {
        let slot = match field {
            FieldName::Title => &mut self.title,
            FieldName::Username => &mut self.username,
            FieldName::Password => &mut self.password,
            FieldName::Url => &mut self.url,
            FieldName::Notes => &mut self.notes,
        };
        slot.zeroize();
        *slot = value;
    }

    /// Check that every required field is present.
    ///
    /// # Errors
    /// - Returns `InvalidInput` naming the first missing field
    pub fn validate(&self) -> Result<()> {
        for field in FieldName::ALL {
            if field.is_required() && self.get(field).is_empty() {
                return Err(Error::InvalidInput(format!("{} is required", field)));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for PlainFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlainFields")
            .field("title", &"[REDACTED]")
            .field("username", &"[REDACTED]")
            .field("password", &"[REDACTED]")
            .field("url", &"[REDACTED]")
            .field("notes", &"[REDACTED]")
            .finish()
    }
}
