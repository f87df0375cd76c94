//! Saved login session.
//!
//! After signup or login the client keeps the bearer token and the account's
//! `encSalt` in a small JSON file. The master password is never written.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use passvault_common::OwnerId;
use passvault_server::AuthResponse;

/// Session file name inside the config directory.
pub const SESSION_FILENAME: &str = "session.json";

/// Credentials for talking to one server as one account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSession {
    /// Base URL of the server.
    pub server: String,
    pub token: String,
    pub enc_salt: String,
    pub user_id: OwnerId,
    pub email: String,
}

impl std::fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSession")
            .field("server", &self.server)
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .finish()
    }
}

impl ClientSession {
    /// Build from a signup/login response.
    pub fn from_auth(server: &str, auth: AuthResponse) -> Self {
        Self {
            server: server.to_string(),
            token: auth.token,
            enc_salt: auth.enc_salt,
            user_id: auth.user_id,
            email: auth.email,
        }
    }

    /// Default session file: `<config_dir>/passvault/session.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("passvault").join(SESSION_FILENAME))
    }

    /// Read a saved session.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| {
            format!(
                "No session at {} (run `passvault login` first)",
                path.display()
            )
        })?;
        serde_json::from_str(&text)
            .with_context(|| format!("Corrupt session file {}", path.display()))
    }

    /// Write the session, creating parent directories.
    ///
    /// On Unix the file is created readable by its owner only, and an
    /// existing file is narrowed to that before the token is written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        // `mode` only applies on creation.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Delete a saved session. Returns whether one existed.
    pub fn remove(path: &Path) -> Result<bool> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}
