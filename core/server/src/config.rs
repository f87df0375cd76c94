//! Server configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use passvault_common::{Error, Result};
use passvault_storage::StoreConfig;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default bearer-token lifetime: seven days.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Default request body limit: 2 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Backend configuration.
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Where accounts and items are kept.
    pub store: StoreConfig,
    /// Lifetime of an issued bearer token, in seconds.
    pub token_ttl_secs: u64,
    /// Maximum accepted request body, in bytes.
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            store: StoreConfig::default(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    /// - I/O failure reading the file
    /// - `Serialization` for malformed JSON or unknown keys
    /// - `InvalidInput` if the loaded values are unusable
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| Error::Serialization(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Check the values make sense.
    ///
    /// # Errors
    /// - `InvalidInput` for an empty host, zero token lifetime or zero body limit
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::InvalidInput("host cannot be empty".to_string()));
        }
        if self.token_ttl_secs == 0 {
            return Err(Error::InvalidInput(
                "tokenTtlSecs must be positive".to_string(),
            ));
        }
        if self.body_limit == 0 {
            return Err(Error::InvalidInput("bodyLimit must be positive".to_string()));
        }
        Ok(())
    }

    /// `host:port` string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Token lifetime.
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:5000");
        assert_eq!(config.token_ttl(), Duration::from_secs(604_800));
        assert_eq!(config.body_limit, 2 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ServerConfig::from_json(r#"{"port": 8080}"#).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.token_ttl_secs, DEFAULT_TOKEN_TTL_SECS);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = ServerConfig::from_json(r#"{"port": 8080, "jwtSecret": "x"}"#);
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("server.json");
        std::fs::write(
            &path,
            r#"{
                "host": "0.0.0.0",
                "store": {"type": "local", "path": "/var/lib/passvault/data.json"},
                "tokenTtlSecs": 3600
            }"#,
        )
        .unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(
            config.store,
            StoreConfig::Local {
                path: PathBuf::from("/var/lib/passvault/data.json")
            }
        );
        assert_eq!(config.token_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn test_load_rejects_zero_ttl() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("server.json");
        std::fs::write(&path, r#"{"tokenTtlSecs": 0}"#).unwrap();

        assert!(matches!(
            ServerConfig::load(&path),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            ServerConfig::load("/nonexistent/passvault.json"),
            Err(Error::Io(_))
        ));
    }
}
