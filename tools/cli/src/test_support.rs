//! In-process server for client and command tests.

use passvault_server::{router, AppState, TokenSessions};
use passvault_storage::MemoryStore;
use std::sync::Arc;
use std::time::Duration;

/// Serve a fresh in-memory backend on an ephemeral port and return its URL.
pub async fn spawn_server() -> String {
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        TokenSessions::new(Duration::from_secs(60)),
    );
    let app = router(state, 2 * 1024 * 1024);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
