//! HTTP request handlers for the REST API.
//!
//! Handles /api/auth/{signup,login}, /api/vault and /api/vault/{id}.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::{hash_password, verify_password, AuthOwner};
use crate::error::{ApiError, ApiResult, MessageResponse};
use crate::server::AppState;
use passvault_common::{Error, ItemId, OwnerId, Result};
use passvault_crypto::{encode_salt, Salt};
use passvault_storage::{normalize_email, ItemRecord};
use passvault_vault::{EncryptedItem, ItemUpdate};

/// Shortest login password accepted at signup.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Request body for signup and login.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthRequest {
    pub email: String,
    pub password: String,
}

/// Response body for signup and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer token for the vault routes.
    pub token: String,
    /// Base64 salt for deriving the per-user vault key.
    pub enc_salt: String,
    pub user_id: OwnerId,
    pub email: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Run CPU-heavy work (password hashing) off the async workers.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Crypto(format!("worker task failed: {}", e)))?
}

fn require_credentials(body: &AuthRequest) -> Result<String> {
    let email = normalize_email(&body.email);
    if email.is_empty() || body.password.is_empty() {
        return Err(Error::InvalidInput("Missing fields".to_string()));
    }
    Ok(email)
}

fn check_new_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

fn invalid_credentials() -> ApiError {
    ApiError(Error::NotPermitted("Invalid credentials".to_string()))
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /api/auth/signup
///
/// Creates the account with a fresh `encSalt` and logs it in.
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<AuthRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = require_credentials(&body)?;
    check_new_password(&body.password)?;

    let password = body.password;
    let password_hash = blocking(move || hash_password(&password)).await?;
    let enc_salt = encode_salt(&Salt::generate());

    let account = state
        .store
        .create_account(&email, password_hash, enc_salt)
        .await?;
    let token = state.sessions.issue(account.id).await;

    tracing::info!(user_id = %account.id, "account created");
    Ok(Json(AuthResponse {
        token,
        enc_salt: account.enc_salt,
        user_id: account.id,
        email: account.email,
    }))
}

/// POST /api/auth/login
///
/// An unknown email and a wrong password produce the same response.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<AuthRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = require_credentials(&body)?;
    let password = body.password;

    let Some(account) = state.store.find_account_by_email(&email).await? else {
        // Spend comparable time so the miss is not observable.
        let _ = blocking(move || hash_password(&password)).await;
        return Err(invalid_credentials());
    };

    let hash = account.password_hash.clone();
    let ok = blocking(move || Ok(verify_password(&password, &hash))).await?;
    if !ok {
        tracing::debug!(user_id = %account.id, "login rejected");
        return Err(invalid_credentials());
    }

    let token = state.sessions.issue(account.id).await;
    Ok(Json(AuthResponse {
        token,
        enc_salt: account.enc_salt,
        user_id: account.id,
        email: account.email,
    }))
}

/// GET /api/vault
pub async fn list_items(
    State(state): State<AppState>,
    Extension(AuthOwner(owner)): Extension<AuthOwner>,
) -> ApiResult<Json<Vec<ItemRecord>>> {
    Ok(Json(state.store.list_items(&owner).await?))
}

/// POST /api/vault
pub async fn create_item(
    State(state): State<AppState>,
    Extension(AuthOwner(owner)): Extension<AuthOwner>,
    Json(item): Json<EncryptedItem>,
) -> ApiResult<(StatusCode, Json<ItemRecord>)> {
    item.validate()?;
    let record = state.store.insert_item(&owner, item).await?;
    tracing::debug!(item_id = %record.id, "item created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/vault/{id}
pub async fn get_item(
    State(state): State<AppState>,
    Extension(AuthOwner(owner)): Extension<AuthOwner>,
    Path(id): Path<String>,
) -> ApiResult<Json<ItemRecord>> {
    let id = ItemId::parse(&id)?;
    Ok(Json(state.store.get_item(&owner, &id).await?))
}

/// PUT /api/vault/{id}
///
/// Replaces the whole envelope; `409` if `expectedVersion` is stale.
pub async fn update_item(
    State(state): State<AppState>,
    Extension(AuthOwner(owner)): Extension<AuthOwner>,
    Path(id): Path<String>,
    Json(update): Json<ItemUpdate>,
) -> ApiResult<Json<ItemRecord>> {
    let id = ItemId::parse(&id)?;
    update.item.validate()?;
    let record = state
        .store
        .update_item(&owner, &id, update.expected_version, update.item)
        .await?;
    tracing::debug!(item_id = %record.id, version = record.version, "item updated");
    Ok(Json(record))
}

/// DELETE /api/vault/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(AuthOwner(owner)): Extension<AuthOwner>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = ItemId::parse(&id)?;
    state.store.delete_item(&owner, &id).await?;
    tracing::debug!(item_id = %id, "item deleted");
    Ok(Json(MessageResponse::new("Deleted")))
}
