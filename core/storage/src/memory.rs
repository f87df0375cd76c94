//! In-memory store for testing.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::record::{AccountRecord, ItemRecord};
use crate::state::StoreState;
use crate::store::VaultStore;
use passvault_common::{ItemId, OwnerId, Result};
use passvault_vault::EncryptedItem;

/// In-memory store.
///
/// Useful for testing and development. All data is stored in memory
/// and lost on drop.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VaultStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create_account(
        &self,
        email: &str,
        password_hash: String,
        enc_salt: String,
    ) -> Result<AccountRecord> {
        self.state
            .write()
            .await
            .create_account(email, password_hash, enc_salt)
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<AccountRecord>> {
        Ok(self.state.read().await.find_account_by_email(email))
    }

    async fn get_account(&self, id: &OwnerId) -> Result<AccountRecord> {
        self.state.read().await.get_account(id)
    }

    async fn insert_item(&self, owner: &OwnerId, item: EncryptedItem) -> Result<ItemRecord> {
        self.state.write().await.insert_item(owner, item)
    }

    async fn list_items(&self, owner: &OwnerId) -> Result<Vec<ItemRecord>> {
        Ok(self.state.read().await.list_items(owner))
    }

    async fn get_item(&self, owner: &OwnerId, id: &ItemId) -> Result<ItemRecord> {
        self.state.read().await.get_item(owner, id)
    }

    async fn update_item(
        &self,
        owner: &OwnerId,
        id: &ItemId,
        expected_version: u64,
        item: EncryptedItem,
    ) -> Result<ItemRecord> {
        self.state
            .write()
            .await
            .update_item(owner, id, expected_version, item)
    }

    async fn delete_item(&self, owner: &OwnerId, id: &ItemId) -> Result<()> {
        self.state.write().await.delete_item(owner, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_item;
    use passvault_common::Error;

    async fn store_with_account() -> (MemoryStore, OwnerId) {
        let store = MemoryStore::new();
        let account = store
            .create_account("alice@example.com", "hash".into(), "salt".into())
            .await
            .unwrap();
        (store, account.id)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (store, owner) = store_with_account().await;
        let record = store.insert_item(&owner, sample_item("a")).await.unwrap();

        assert_eq!(record.version, 1);
        assert_eq!(record.owner_id, owner);
        assert_eq!(record.created_at, record.updated_at);

        let fetched = store.get_item(&owner, &record.id).await.unwrap();
        assert_eq!(fetched, record);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (store, _) = store_with_account().await;
        let result = store
            .create_account(" Alice@Example.com ", "h".into(), "s".into())
            .await;
        assert!(matches!(result, Err(Error::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_find_account_is_case_insensitive() {
        let (store, owner) = store_with_account().await;
        let found = store
            .find_account_by_email("ALICE@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, owner);
        assert!(store
            .find_account_by_email("bob@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_items_scoped_to_owner() {
        let (store, alice) = store_with_account().await;
        let bob = store
            .create_account("bob@example.com", "h".into(), "s".into())
            .await
            .unwrap()
            .id;

        let record = store.insert_item(&alice, sample_item("a")).await.unwrap();

        assert!(store.list_items(&bob).await.unwrap().is_empty());
        assert!(matches!(
            store.get_item(&bob, &record.id).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store
                .update_item(&bob, &record.id, 1, sample_item("b"))
                .await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store.delete_item(&bob, &record.id).await,
            Err(Error::NotFound(_))
        ));

        assert_eq!(store.list_items(&alice).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_for_unknown_owner_fails() {
        let store = MemoryStore::new();
        let result = store
            .insert_item(&OwnerId::generate(), sample_item("a"))
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (store, owner) = store_with_account().await;
        let first = store.insert_item(&owner, sample_item("1")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.insert_item(&owner, sample_item("2")).await.unwrap();

        let ids: Vec<ItemId> = store
            .list_items(&owner)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let (store, owner) = store_with_account().await;
        let record = store.insert_item(&owner, sample_item("a")).await.unwrap();

        let updated = store
            .update_item(&owner, &record.id, 1, sample_item("b"))
            .await
            .unwrap();

        assert_eq!(updated.id, record.id);
        assert_eq!(updated.version, 2);
        assert_eq!(updated.created_at, record.created_at);
        assert!(updated.updated_at >= record.updated_at);
        assert_eq!(updated.item, sample_item("b"));
    }

    #[tokio::test]
    async fn test_stale_update_conflicts() {
        let (store, owner) = store_with_account().await;
        let record = store.insert_item(&owner, sample_item("a")).await.unwrap();

        store
            .update_item(&owner, &record.id, 1, sample_item("first"))
            .await
            .unwrap();
        let lost = store
            .update_item(&owner, &record.id, 1, sample_item("second"))
            .await;

        assert!(matches!(lost, Err(Error::Conflict(_))));
        let current = store.get_item(&owner, &record.id).await.unwrap();
        assert_eq!(current.item, sample_item("first"));
    }

    #[tokio::test]
    async fn test_delete() {
        let (store, owner) = store_with_account().await;
        let record = store.insert_item(&owner, sample_item("a")).await.unwrap();

        store.delete_item(&owner, &record.id).await.unwrap();
        assert!(matches!(
            store.get_item(&owner, &record.id).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store.delete_item(&owner, &record.id).await,
            Err(Error::NotFound(_))
        ));
    }
}
