//! Core data types for the storage layer.
//!
//! Records hold ciphertext only; nothing in here ever carries plaintext.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::{EncryptedEnvelope, WrappedIdentity};

/// Title used when a record is created without one.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Trim a caller-supplied title, falling back to [`DEFAULT_TITLE`].
pub fn normalize_title(title: Option<&str>) -> String {
    match title.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => DEFAULT_TITLE.to_string(),
    }
}

/// An encrypted, signed note as persisted by a record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRecord {
    /// Unique identifier for this record
    pub id: Uuid,

    /// Account that owns this record
    pub owner_id: Uuid,

    /// Cleartext title (titles are not encrypted)
    pub title: String,

    /// Encrypted body
    pub envelope: EncryptedEnvelope,

    /// RSA-PSS signature over the plaintext body; absent on unsigned records
    pub signature: Option<Vec<u8>>,

    /// When this record was created
    pub created_at: DateTime<Utc>,

    /// Last successful write; compared exactly on guarded updates
    pub version_marker: DateTime<Utc>,
}

/// Builder for creating new records.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub title: String,
    pub envelope: EncryptedEnvelope,
    pub signature: Option<Vec<u8>>,
}

impl NewRecord {
    pub fn new(title: Option<&str>, envelope: EncryptedEnvelope) -> Self {
        Self {
            title: normalize_title(title),
            envelope,
            signature: None,
        }
    }

    pub fn with_signature(mut self, signature: Vec<u8>) -> Self {
        self.signature = Some(signature);
        self
    }
}

/// An account as held by the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub identity: WrappedIdentity,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: impl Into<String>, identity: WrappedIdentity) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            identity,
            created_at: Utc::now(),
        }
    }
}
