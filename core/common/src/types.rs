//! Identifier types used throughout PassVault.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of an account; every vault item is owned by exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(Uuid);

impl OwnerId {
    /// Generate a fresh random owner identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an owner identifier from its string form.
    ///
    /// # Errors
    /// - Returns error if `id` is not a valid UUID
    pub fn parse(id: &str) -> crate::Result<Self> {
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| crate::Error::InvalidInput(format!("Invalid owner id: {}", id)))
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OwnerId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}

/// Identifier of a stored vault item.
///
/// Stays the same across edits; only deletion retires it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Generate a fresh random item identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an item identifier from its string form.
    ///
    /// # Errors
    /// - Returns error if `id` is not a valid UUID
    pub fn parse(id: &str) -> crate::Result<Self> {
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| crate::Error::InvalidInput(format!("Invalid item id: {}", id)))
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}
