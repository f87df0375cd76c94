//! Collection semantics shared by every store backend.
//!
//! Backends differ only in where `StoreState` lives; ownership filtering,
//! uniqueness and version checks are implemented once here.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::record::{normalize_email, AccountRecord, ItemRecord};
use passvault_common::{Error, ItemId, OwnerId, Result};
use passvault_vault::EncryptedItem;

/// On-disk document format version.
pub const DOCUMENT_VERSION: u32 = 1;

/// In-memory collections.
#[derive(Debug, Clone, Default)]
pub(crate) struct StoreState {
    accounts: HashMap<OwnerId, AccountRecord>,
    items: HashMap<ItemId, ItemRecord>,
}

/// Serialized form of `StoreState`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Document {
    pub version: u32,
    pub accounts: Vec<AccountRecord>,
    pub items: Vec<ItemRecord>,
}

impl StoreState {
    pub fn from_document(doc: Document) -> Result<Self> {
        if doc.version != DOCUMENT_VERSION {
            return Err(Error::Storage(format!(
                "Unsupported store document version: {}",
                doc.version
            )));
        }
        Ok(Self {
            accounts: doc.accounts.into_iter().map(|a| (a.id, a)).collect(),
            items: doc.items.into_iter().map(|i| (i.id, i)).collect(),
        })
    }

    pub fn to_document(&self) -> Document {
        let mut accounts: Vec<AccountRecord> = self.accounts.values().cloned().collect();
        accounts.sort_by_key(|a| a.created_at);
        let mut items: Vec<ItemRecord> = self.items.values().cloned().collect();
        items.sort_by_key(|i| i.created_at);

        Document {
            version: DOCUMENT_VERSION,
            accounts,
            items,
        }
    }

    pub fn create_account(
        &mut self,
        email: &str,
        password_hash: String,
        enc_salt: String,
    ) -> Result<AccountRecord> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(Error::InvalidInput("Email cannot be empty".to_string()));
        }
        if self.find_account_by_email(&email).is_some() {
            return Err(Error::AlreadyExists("User already exists".to_string()));
        }

        let now = Utc::now();
        let account = AccountRecord {
            id: OwnerId::generate(),
            email,
            password_hash,
            enc_salt,
            created_at: now,
            updated_at: now,
        };
        self.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    pub fn find_account_by_email(&self, email: &str) -> Option<AccountRecord> {
        let email = normalize_email(email);
        self.accounts.values().find(|a| a.email == email).cloned()
    }

    pub fn get_account(&self, id: &OwnerId) -> Result<AccountRecord> {
        self.accounts
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Account not found: {}", id)))
    }

    pub fn insert_item(&mut self, owner: &OwnerId, item: EncryptedItem) -> Result<ItemRecord> {
        if !self.accounts.contains_key(owner) {
            return Err(Error::NotFound(format!("Account not found: {}", owner)));
        }

        let now = Utc::now();
        let record = ItemRecord {
            id: ItemId::generate(),
            owner_id: *owner,
            version: 1,
            created_at: now,
            updated_at: now,
            item,
        };
        self.items.insert(record.id, record.clone());
        Ok(record)
    }

    pub fn list_items(&self, owner: &OwnerId) -> Vec<ItemRecord> {
        let mut items: Vec<ItemRecord> = self
            .items
            .values()
            .filter(|r| r.owner_id == *owner)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items
    }

    pub fn get_item(&self, owner: &OwnerId, id: &ItemId) -> Result<ItemRecord> {
        self.items
            .get(id)
            .filter(|r| r.owner_id == *owner)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Item not found: {}", id)))
    }

    pub fn update_item(
        &mut self,
        owner: &OwnerId,
        id: &ItemId,
        expected_version: u64,
        item: EncryptedItem,
    ) -> Result<ItemRecord> {
        let record = self
            .items
            .get_mut(id)
            .filter(|r| r.owner_id == *owner)
            .ok_or_else(|| Error::NotFound(format!("Item not found: {}", id)))?;

        if record.version != expected_version {
            return Err(Error::Conflict(format!(
                "Item {} is at version {}, update was based on {}",
                id, record.version, expected_version
            )));
        }

        record.item = item;
        record.version += 1;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    pub fn delete_item(&mut self, owner: &OwnerId, id: &ItemId) -> Result<()> {
        match self.items.get(id) {
            Some(r) if r.owner_id == *owner => {
                self.items.remove(id);
                Ok(())
            }
            _ => Err(Error::NotFound(format!("Item not found: {}", id))),
        }
    }
}
