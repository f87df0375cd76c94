//! Backend HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{auth_middleware, TokenSessions};
use crate::config::ServerConfig;
use crate::handlers;
use passvault_common::Result;
use passvault_storage::{open_store, VaultStore};

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Accounts and encrypted items.
    pub store: Arc<dyn VaultStore>,
    /// Issued bearer tokens.
    pub sessions: Arc<TokenSessions>,
}

impl AppState {
    pub fn new(store: Arc<dyn VaultStore>, sessions: TokenSessions) -> Self {
        Self {
            store,
            sessions: Arc::new(sessions),
        }
    }
}

/// Build the application router.
///
/// - GET /health (public)
/// - POST /api/auth/signup, POST /api/auth/login (public)
/// - GET, POST /api/vault (bearer token)
/// - GET, PUT, DELETE /api/vault/{id} (bearer token)
pub fn router(state: AppState, body_limit: usize) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/login", post(handlers::login))
        .with_state(state.clone());

    let vault_routes = Router::new()
        .route(
            "/api/vault",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route(
            "/api/vault/{id}",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(vault_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Open the configured store and serve until Ctrl-C.
///
/// # Errors
/// - Invalid configuration
/// - Store could not be opened
/// - Address could not be bound
pub async fn start_server(config: &ServerConfig) -> Result<()> {
    config.validate()?;

    let store = open_store(&config.store).await?;
    let state = AppState::new(store, TokenSessions::new(config.token_ttl()));
    let app = router(state, config.body_limit);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .inspect_err(|e| tracing::error!(%addr, error = %e, "failed to bind"))?;

    tracing::info!("PassVault server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("PassVault server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
