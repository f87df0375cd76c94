//! PassVault REST backend.
//!
//! Stores accounts and opaque encrypted vault items. Item contents are
//! encrypted by the client before they arrive; nothing here can read them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::{hash_password, verify_password, AuthOwner, TokenSessions};
pub use config::ServerConfig;
pub use error::{ApiError, MessageResponse};
pub use handlers::AuthResponse;
pub use server::{router, start_server, AppState};
