//! Error types for Notevault core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages and exit codes.
//!
//! Signature verification is deliberately absent: an invalid signature is a
//! `false` from [`crate::crypto::PublicIdentity::verify`], never an error.

use thiserror::Error;
use uuid::Uuid;

use crate::storage::types::SignedRecord;

/// Result type alias for Notevault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Core error type for Notevault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The password did not open the wrapped identity
    #[error("Incorrect password")]
    WrongPassword,

    /// Envelope tag mismatch: tampered data or the wrong key
    #[error("Authentication failed (tag mismatch: wrong key or tampered data)")]
    AuthenticationFailed,

    /// The caller's version marker no longer matches the stored record
    #[error("Conflict: record {} changed at {}", .server_record.id, .server_record.version_marker)]
    Conflict {
        /// The record as it currently exists in storage
        server_record: Box<SignedRecord>,
    },

    /// Record exists but belongs to another owner
    #[error("Forbidden: record {0} belongs to another account")]
    Forbidden(Uuid),

    /// Record does not exist
    #[error("Record not found: {0}")]
    NotFound(Uuid),

    /// Account does not exist
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Operation requires an unlocked session
    #[error("Vault is locked")]
    Locked,

    /// Malformed or unusable key material
    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    /// Malformed wire data (base64, lengths, timestamps)
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Cryptographic primitive failure other than authentication
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl From<base64::DecodeError> for VaultError {
    fn from(err: base64::DecodeError) -> Self {
        VaultError::Encoding(format!("Invalid base64: {}", err))
    }
}

impl VaultError {
    /// HTTP-style status a transport collaborator would answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            VaultError::WrongPassword | VaultError::AuthenticationFailed => 401,
            VaultError::Forbidden(_) => 403,
            VaultError::NotFound(_) | VaultError::AccountNotFound(_) => 404,
            VaultError::Conflict { .. } => 409,
            VaultError::Locked => 423,
            VaultError::InvalidKey(_) | VaultError::Encoding(_) | VaultError::InvalidInput(_) => {
                400
            }
            VaultError::Json { .. } => 400,
            VaultError::Crypto(_)
            | VaultError::Storage(_)
            | VaultError::Sqlite { .. }
            | VaultError::Io { .. } => 500,
        }
    }

    /// Whether this error means "the password is wrong" from the user's view.
    pub fn is_wrong_password(&self) -> bool {
        matches!(
            self,
            VaultError::WrongPassword | VaultError::AuthenticationFailed
        )
    }
}
