//! Common error types for PassVault.

use thiserror::Error;

/// Message shown for any failure that must not reveal which secret was wrong.
pub const SECRET_FAILURE_MESSAGE: &str = "wrong password or corrupted data";

/// Top-level error type for PassVault operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or unusable input (empty master password, absent required field).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Authentication tag verification failed.
    ///
    /// A wrong master password and tampered data both end up here and carry
    /// no detail, so callers cannot be used as a password-guessing oracle.
    #[error("{}", SECRET_FAILURE_MESSAGE)]
    Integrity,

    /// Key derivation could not run (invalid parameters, primitive failure).
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// Envelope text could not be decoded (bad base64, wrong lengths).
    #[error("Malformed envelope: {0}")]
    EnvelopeFormat(String),

    /// Cryptographic operation failed for a reason other than authentication.
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Operation not permitted (missing or invalid credentials).
    #[error("Not permitted: {0}")]
    NotPermitted(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Concurrent modification detected.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl Error {
    /// Whether this failure involves secret material and must be reported
    /// with the generic message only.
    pub fn is_secret_failure(&self) -> bool {
        matches!(self, Error::Integrity | Error::KeyDerivation(_))
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
