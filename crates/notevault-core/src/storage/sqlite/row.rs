//! Row types for database queries.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use uuid::Uuid;

use crate::crypto::{EncryptedEnvelope, WrappedIdentity};
use crate::encoding;
use crate::error::{Result, VaultError};
use crate::storage::types::{Account, SignedRecord};

pub(super) const RECORD_COLUMNS: &str =
    "id, owner_id, title, envelope_json, signature, created_at, version_marker";

pub(super) const ACCOUNT_COLUMNS: &str =
    "id, name, public_key, wrapped_private_key, created_at";

/// Fixed-width nanosecond RFC 3339, so text order is time order and
/// equality is exact.
pub(super) fn format_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(text)
        .map_err(|e| VaultError::Storage(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc))
}

fn parse_uuid(text: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(text).map_err(|e| VaultError::Storage(format!("Invalid {} UUID: {}", what, e)))
}

/// Raw row data from the records table, before parsing into domain types.
#[derive(Debug)]
pub(super) struct RecordRow {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub envelope_json: String,
    pub signature: Option<String>,
    pub created_at: String,
    pub version_marker: String,
}

impl RecordRow {
    /// Read a row selected with [`RECORD_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            title: row.get(2)?,
            envelope_json: row.get(3)?,
            signature: row.get(4)?,
            created_at: row.get(5)?,
            version_marker: row.get(6)?,
        })
    }
}

impl TryFrom<RecordRow> for SignedRecord {
    type Error = VaultError;

    fn try_from(row: RecordRow) -> Result<Self> {
        let envelope = EncryptedEnvelope::from_json(&row.envelope_json)
            .map_err(|e| VaultError::Storage(format!("Invalid envelope JSON: {}", e)))?;
        let signature = row
            .signature
            .as_deref()
            .map(encoding::decode)
            .transpose()?;

        Ok(SignedRecord {
            id: parse_uuid(&row.id, "record")?,
            owner_id: parse_uuid(&row.owner_id, "owner")?,
            title: row.title,
            envelope,
            signature,
            created_at: parse_timestamp(&row.created_at)?,
            version_marker: parse_timestamp(&row.version_marker)?,
        })
    }
}

/// Raw row data from the accounts table.
#[derive(Debug)]
pub(super) struct AccountRow {
    pub id: String,
    pub name: String,
    pub public_key: String,
    pub wrapped_private_key: String,
    pub created_at: String,
}

impl AccountRow {
    /// Read a row selected with [`ACCOUNT_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            public_key: row.get(2)?,
            wrapped_private_key: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

impl TryFrom<AccountRow> for Account {
    type Error = VaultError;

    fn try_from(row: AccountRow) -> Result<Self> {
        Ok(Account {
            id: parse_uuid(&row.id, "account")?,
            name: row.name,
            identity: WrappedIdentity {
                public_key: row.public_key,
                wrapped_private_key: row.wrapped_private_key,
            },
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}
