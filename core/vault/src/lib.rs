//! Vault item encryption for PassVault.
//!
//! This module provides:
//! - Plaintext item fields with zeroization
//! - The encrypted item envelope stored by the server
//! - `encrypt_item` / `decrypt_item` over an explicit session context
//! - A random password generator
//!
//! # Architecture
//! Everything here runs on the client. It performs no I/O; the server only
//! ever sees `EncryptedItem` values and cannot decrypt them.

pub mod cipher;
pub mod context;
pub mod envelope;
pub mod generator;
pub mod item;

pub use cipher::{decrypt_item, encrypt_item, rekey_item};
pub use context::{SaltPolicy, SessionContext};
pub use envelope::{EncryptedItem, ItemUpdate};
pub use generator::{generate_password, GeneratorOptions};
pub use item::{FieldName, PlainFields};
