//! Store selection from configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::local::LocalStore;
use crate::memory::MemoryStore;
use crate::store::VaultStore;
use passvault_common::Result;

/// Which backend to open, as found in the server configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Volatile store; everything is lost on shutdown.
    Memory,
    /// Single JSON document on the local filesystem.
    Local { path: PathBuf },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Local {
            path: PathBuf::from("passvault-data.json"),
        }
    }
}

/// Open the configured store.
///
/// # Errors
/// - Whatever the backend reports while opening (I/O, corrupt document)
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn VaultStore>> {
    let store: Arc<dyn VaultStore> = match config {
        StoreConfig::Memory => Arc::new(MemoryStore::new()),
        StoreConfig::Local { path } => Arc::new(LocalStore::open(path).await?),
    };
    info!(backend = store.name(), "Store ready");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_format() {
        let memory: StoreConfig = serde_json::from_str(r#"{"type":"memory"}"#).unwrap();
        assert_eq!(memory, StoreConfig::Memory);

        let local: StoreConfig =
            serde_json::from_str(r#"{"type":"local","path":"/tmp/vault.json"}"#).unwrap();
        assert_eq!(
            local,
            StoreConfig::Local {
                path: PathBuf::from("/tmp/vault.json")
            }
        );

        assert!(serde_json::from_str::<StoreConfig>(r#"{"type":"gdrive"}"#).is_err());
    }

    #[tokio::test]
    async fn test_open_each_backend() {
        let memory = open_store(&StoreConfig::Memory).await.unwrap();
        assert_eq!(memory.name(), "memory");

        let temp = TempDir::new().unwrap();
        let local = open_store(&StoreConfig::Local {
            path: temp.path().join("store.json"),
        })
        .await
        .unwrap();
        assert_eq!(local.name(), "local");
    }
}
