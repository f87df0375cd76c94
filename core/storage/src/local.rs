//! Local filesystem store.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::record::{AccountRecord, ItemRecord};
use crate::state::{Document, StoreState};
use crate::store::VaultStore;
use passvault_common::{Error, ItemId, OwnerId, Result};
use passvault_vault::EncryptedItem;

/// Local filesystem store.
///
/// Keeps all collections in one JSON document. Every mutation is applied to
/// a copy, written to a temporary file and renamed over the document, and
/// only then made visible; a failed write leaves both disk and memory
/// unchanged.
pub struct LocalStore {
    path: PathBuf,
    state: RwLock<StoreState>,
}

impl LocalStore {
    /// Open the store at `path`, creating an empty one if it doesn't exist.
    ///
    /// # Errors
    /// - I/O failure reading the document or creating its directory
    /// - `Serialization` if the document is not valid JSON
    /// - `Storage` if the document version is unsupported
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let state = if fs::try_exists(&path).await? {
            let bytes = fs::read(&path).await?;
            let doc: Document = serde_json::from_slice(&bytes)
                .map_err(|e| Error::Serialization(format!("{}: {}", path.display(), e)))?;
            StoreState::from_document(doc)?
        } else {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).await?;
                }
            }
            StoreState::default()
        };

        info!(path = %path.display(), "Opened local store");
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn mutate<T>(&self, f: impl FnOnce(&mut StoreState) -> Result<T>) -> Result<T> {
        let mut guard = self.state.write().await;
        let mut next = guard.clone();
        let out = f(&mut next)?;
        self.persist(&next).await?;
        *guard = next;
        Ok(out)
    }

    async fn persist(&self, state: &StoreState) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&state.to_document())
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "Store persisted");
        Ok(())
    }
}

#[async_trait]
impl VaultStore for LocalStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn create_account(
        &self,
        email: &str,
        password_hash: String,
        enc_salt: String,
    ) -> Result<AccountRecord> {
        self.mutate(|s| s.create_account(email, password_hash, enc_salt))
            .await
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<AccountRecord>> {
        Ok(self.state.read().await.find_account_by_email(email))
    }

    async fn get_account(&self, id: &OwnerId) -> Result<AccountRecord> {
        self.state.read().await.get_account(id)
    }

    async fn insert_item(&self, owner: &OwnerId, item: EncryptedItem) -> Result<ItemRecord> {
        self.mutate(|s| s.insert_item(owner, item)).await
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
        self.mutate(|s| s.update_item(owner, id, expected_version, item))
            .await
    }

    async fn delete_item(&self, owner: &OwnerId, id: &ItemId) -> Result<()> {
        self.mutate(|s| s.delete_item(owner, id)).await
    }
}
