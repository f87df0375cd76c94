//! Server-side persistence for PassVault.
//!
//! The server never sees plaintext: it stores accounts (email, login hash,
//! encryption salt) and opaque encrypted item envelopes, each owned by one
//! account.
//!
//! # Design Principles
//! - Backends only decide where data lives; ownership, uniqueness and
//!   version checks are shared
//! - Every item operation is scoped to its owner
//! - Writes are all-or-nothing

pub mod backend;
pub mod local;
pub mod memory;
pub mod record;
mod state;
pub mod store;

#[cfg(test)]
mod test_support;

pub use backend::{open_store, StoreConfig};
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use record::{normalize_email, AccountRecord, ItemRecord};
pub use state::DOCUMENT_VERSION;
pub use store::VaultStore;
