//! Storage trait definition.

use async_trait::async_trait;

use crate::record::{AccountRecord, ItemRecord};
use passvault_common::{ItemId, OwnerId, Result};
use passvault_vault::EncryptedItem;

/// Persistence for accounts and encrypted vault items.
///
/// Every item operation is scoped to an owner: an item belonging to someone
/// else behaves exactly like a missing one.
///
/// Concurrent edits of one item are resolved with optimistic concurrency:
/// `update_item` only succeeds if the caller saw the current version.
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Backend name (e.g., "memory", "local").
    fn name(&self) -> &str;

    /// Create an account.
    ///
    /// # Errors
    /// - `AlreadyExists` if the email is taken
    /// - `InvalidInput` if the email is empty
    async fn create_account(
        &self,
        email: &str,
        password_hash: String,
        enc_salt: String,
    ) -> Result<AccountRecord>;

    /// Look up an account by email (case-insensitive).
    async fn find_account_by_email(&self, email: &str) -> Result<Option<AccountRecord>>;

    /// Get an account by id.
    ///
    /// # Errors
    /// - `NotFound` if no such account exists
    async fn get_account(&self, id: &OwnerId) -> Result<AccountRecord>;

    /// Store a new item for `owner`.
    ///
    /// # Postconditions
    /// - Returns a record at version 1 with a fresh id
    ///
    /// # Errors
    /// - `NotFound` if the owner does not exist
    async fn insert_item(&self, owner: &OwnerId, item: EncryptedItem) -> Result<ItemRecord>;

    /// List the owner's items, newest first.
    async fn list_items(&self, owner: &OwnerId) -> Result<Vec<ItemRecord>>;

    /// Get one of the owner's items.
    ///
    /// # Errors
    /// - `NotFound` if missing or owned by someone else
    async fn get_item(&self, owner: &OwnerId, id: &ItemId) -> Result<ItemRecord>;

    /// Replace an item's envelope.
    ///
    /// # Postconditions
    /// - `version` is incremented and `updated_at` refreshed
    ///
    /// # Errors
    /// - `NotFound` if missing or owned by someone else
    /// - `Conflict` if `expected_version` is not the stored version
    async fn update_item(
        &self,
        owner: &OwnerId,
        id: &ItemId,
        expected_version: u64,
        item: EncryptedItem,
    ) -> Result<ItemRecord>;

    /// Delete one of the owner's items.
    ///
    /// # Errors
    /// - `NotFound` if missing or owned by someone else
    async fn delete_item(&self, owner: &OwnerId, id: &ItemId) -> Result<()>;
}
