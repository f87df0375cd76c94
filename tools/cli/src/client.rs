//! HTTP client for the PassVault REST API.
//!
//! Only envelopes cross this boundary; encryption and decryption happen in
//! the caller before and after.

use anyhow::{anyhow, Context, Result};
use reqwest::{Response, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use passvault_common::ItemId;
use passvault_server::{AuthResponse, MessageResponse};
use passvault_storage::ItemRecord;
use passvault_vault::{EncryptedItem, ItemUpdate};

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// REST API client, optionally holding a bearer token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for the server at `server` (e.g. `http://127.0.0.1:5000`).
    pub fn new(server: &str) -> Result<Self> {
        let mut base =
            Url::parse(server).with_context(|| format!("Invalid server URL: {}", server))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base,
            token: None,
        })
    }

    /// Attach a bearer token for the vault routes.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("Invalid endpoint: {}", path))
    }

    fn item_endpoint(&self, id: &ItemId) -> Result<Url> {
        self.endpoint(&format!("api/vault/{}", id))
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| anyhow!("Not logged in; run `passvault login` first"))?;
        Ok(builder.bearer_auth(token))
    }

    /// POST /api/auth/signup
    pub async fn signup(&self, email: &str, password: &str) -> Result<AuthResponse> {
        self.authenticate("api/auth/signup", email, password).await
    }

    /// POST /api/auth/login
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        self.authenticate("api/auth/login", email, password).await
    }

    async fn authenticate(&self, path: &str, email: &str, password: &str) -> Result<AuthResponse> {
        let response = self
            .http
            .post(self.endpoint(path)?)
            .json(&Credentials { email, password })
            .send()
            .await
            .context("Failed to reach server")?;
        Ok(check(response).await?.json().await?)
    }

    /// GET /api/vault
    pub async fn list_items(&self) -> Result<Vec<ItemRecord>> {
        let request = self.authorized(self.http.get(self.endpoint("api/vault")?))?;
        let response = request.send().await.context("Failed to reach server")?;
        Ok(check(response).await?.json().await?)
    }

    /// POST /api/vault
    pub async fn create_item(&self, item: &EncryptedItem) -> Result<ItemRecord> {
        let request = self.authorized(self.http.post(self.endpoint("api/vault")?))?;
        let response = request
            .json(item)
            .send()
            .await
            .context("Failed to reach server")?;
        Ok(check(response).await?.json().await?)
    }

    /// GET /api/vault/{id}
    pub async fn get_item(&self, id: &ItemId) -> Result<ItemRecord> {
        let request = self.authorized(self.http.get(self.item_endpoint(id)?))?;
        let response = request.send().await.context("Failed to reach server")?;
        Ok(check(response).await?.json().await?)
    }

    /// PUT /api/vault/{id}
    pub async fn update_item(&self, id: &ItemId, update: &ItemUpdate) -> Result<ItemRecord> {
        let request = self.authorized(self.http.put(self.item_endpoint(id)?))?;
        let response = request
            .json(update)
            .send()
            .await
            .context("Failed to reach server")?;
        Ok(check(response).await?.json().await?)
    }

    /// DELETE /api/vault/{id}
    pub async fn delete_item(&self, id: &ItemId) -> Result<()> {
        let request = self.authorized(self.http.delete(self.item_endpoint(id)?))?;
        let response = request.send().await.context("Failed to reach server")?;
        check(response).await?;
        Ok(())
    }
}

/// Turn a non-success response into an error carrying the server's message.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    debug!(%status, url = %response.url(), "response received");
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<MessageResponse>(&body)
        .map(|m| m.message)
        .unwrap_or(body);

    Err(match status {
        StatusCode::CONFLICT if message.starts_with("Item") => anyhow!(
            "The item was changed elsewhere since it was read; run the command again"
        ),
        StatusCode::UNAUTHORIZED if message == "Unauthorized" => {
            anyhow!("Session expired or invalid; run `passvault login`")
        }
        _ => anyhow!("Server returned {}: {}", status, message),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_server;
    use passvault_crypto::KdfParams;
    use passvault_vault::{encrypt_item, PlainFields, SessionContext};

    fn envelope(title: &str) -> EncryptedItem {
        let fields = PlainFields::new(title, "pw");
        encrypt_item(
            &fields,
            b"master",
            &SessionContext::per_item(KdfParams::default()),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_joining() {
        let client = ApiClient::new("http://localhost:5000").unwrap();
        assert_eq!(
            client.endpoint("api/vault").unwrap().as_str(),
            "http://localhost:5000/api/vault"
        );

        let prefixed = ApiClient::new("https://example.com/passvault").unwrap();
        assert_eq!(
            prefixed.endpoint("api/vault").unwrap().as_str(),
            "https://example.com/passvault/api/vault"
        );
    }

    #[test]
    fn test_invalid_server_url() {
        assert!(ApiClient::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_vault_calls_need_token() {
        let client = ApiClient::new("http://localhost:5000").unwrap();
        let err = client.list_items().await.unwrap_err();
        assert!(err.to_string().contains("Not logged in"));
    }

    #[tokio::test]
    async fn test_round_trip_against_server() {
        let server = spawn_server().await;
        let anonymous = ApiClient::new(&server).unwrap();

        let auth = anonymous
            .signup("carol@example.com", "carol-password")
            .await
            .unwrap();
        let login = anonymous
            .login("carol@example.com", "carol-password")
            .await
            .unwrap();
        assert_eq!(login.user_id, auth.user_id);

        let client = anonymous.clone().with_token(login.token);
        let created = client.create_item(&envelope("one")).await.unwrap();
        assert_eq!(client.list_items().await.unwrap().len(), 1);

        let fetched = client.get_item(&created.id).await.unwrap();
        assert_eq!(fetched, created);

        let update = ItemUpdate {
            expected_version: 1,
            item: envelope("two"),
        };
        let updated = client.update_item(&created.id, &update).await.unwrap();
        assert_eq!(updated.version, 2);

        let stale = client.update_item(&created.id, &update).await.unwrap_err();
        assert!(stale.to_string().contains("changed elsewhere"));

        client.delete_item(&created.id).await.unwrap();
        assert!(client.get_item(&created.id).await.is_err());
    }

    #[tokio::test]
    async fn test_login_failure_message() {
        let server = spawn_server().await;
        let client = ApiClient::new(&server).unwrap();

        let err = client.login("nobody@example.com", "pw").await.unwrap_err();
        assert!(err.to_string().contains("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_bad_token_reported() {
        let server = spawn_server().await;
        let client = ApiClient::new(&server).unwrap().with_token("expired");

        let err = client.list_items().await.unwrap_err();
        assert!(err.to_string().contains("passvault login"));
    }
}
