//! Persisted documents: accounts and vault items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use passvault_common::{ItemId, OwnerId};
use passvault_vault::EncryptedItem;

/// A registered account.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub id: OwnerId,
    /// Normalized (trimmed, lowercase) email; unique.
    pub email: String,
    /// Login credential hash (PHC string). Unrelated to vault encryption.
    pub password_hash: String,
    /// Base64 salt handed to the client for vault key derivation.
    pub enc_salt: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for AccountRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// A stored vault item.
///
/// `owner_id`, `version` and the timestamps belong to the server; the client
/// only ever supplies `item`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: ItemId,
    pub owner_id: OwnerId,
    /// Incremented on every update; used for optimistic concurrency.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub item: EncryptedItem,
}

/// Normalize an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
