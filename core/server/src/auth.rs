//! Login credentials, bearer-token sessions and the auth middleware.
//!
//! The login password is only ever hashed here (Argon2id). It is a separate
//! secret from the vault key the client derives locally; the server never
//! handles anything that could decrypt an item.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use rand::rngs::OsRng;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ApiError;
use crate::server::AppState;
use passvault_common::{Error, OwnerId, Result};

/// Hash a login password into a PHC string.
///
/// # Errors
/// - `InvalidInput` if `password` is empty
/// - `Crypto` if hashing fails
pub fn hash_password(password: &str) -> Result<String> {
    if password.is_empty() {
        return Err(Error::InvalidInput("Missing fields".to_string()));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| Error::Crypto(format!("Password hashing failed: {}", e)))
}

/// Check a login password against a stored PHC string.
///
/// A malformed stored hash verifies as `false`.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

struct Session {
    owner: OwnerId,
    expires_at: Instant,
}

/// In-process table of issued bearer tokens.
///
/// Tokens are random UUIDs, valid until their lifetime runs out. The table
/// does not survive a restart; clients simply log in again.
pub struct TokenSessions {
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl TokenSessions {
    /// Create an empty table issuing tokens valid for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Issue a new token for `owner`.
    ///
    /// Expired entries are dropped on the way.
    pub async fn issue(&self, owner: OwnerId) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let now = Instant::now();

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(
            token.clone(),
            Session {
                owner,
                expires_at: now + self.ttl,
            },
        );
        token
    }

    /// Owner of a live token, if any.
    pub async fn resolve(&self, token: &str) -> Option<OwnerId> {
        let sessions = self.sessions.read().await;
        sessions
            .get(token)
            .filter(|s| s.expires_at > Instant::now())
            .map(|s| s.owner)
    }
}

/// Authenticated owner, inserted into request extensions by `auth_middleware`.
#[derive(Debug, Clone, Copy)]
pub struct AuthOwner(pub OwnerId);

/// Middleware that requires `Authorization: Bearer <token>`.
///
/// On success the resolved owner is attached to the request; everything
/// downstream trusts it instead of anything in the body.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> std::result::Result<Response, ApiError> {
    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    let Some(token) = token else {
        return Err(ApiError::unauthorized());
    };

    match state.sessions.resolve(token).await {
        Some(owner) => {
            request.extensions_mut().insert(AuthOwner(owner));
            Ok(next.run(request).await)
        }
        None => {
            tracing::debug!("rejected unknown or expired token");
            Err(ApiError::unauthorized())
        }
    }
}
