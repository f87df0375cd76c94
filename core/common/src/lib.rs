//! Common utilities and types shared across PassVault modules.
//!
//! This module provides the error taxonomy used by every crate and the
//! identifier types for accounts and vault items.

pub mod error;
pub mod types;

pub use error::{Error, Result, SECRET_FAILURE_MESSAGE};
pub use types::{ItemId, OwnerId};
