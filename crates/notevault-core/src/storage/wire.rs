//! JSON shapes exchanged with a remote record store.
//!
//! Binary fields are standard base64, timestamps are RFC 3339 with full
//! nanosecond precision so a marker survives the round trip unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::SignedRecord;
use crate::conflict::{Precondition, UpdateRequest};
use crate::crypto::EncryptedEnvelope;
use crate::error::{Result, VaultError};

/// A record as sent to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordWire {
    pub id: Uuid,
    pub title: String,
    #[serde(flatten)]
    pub envelope: EncryptedEnvelope,
    #[serde(default, with = "crate::encoding::b64_option")]
    pub signature: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub version_marker: DateTime<Utc>,
}

impl From<&SignedRecord> for RecordWire {
    fn from(record: &SignedRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            envelope: record.envelope.clone(),
            signature: record.signature.clone(),
            created_at: record.created_at,
            version_marker: record.version_marker,
        }
    }
}

impl RecordWire {
    /// Rebuild the stored record; ownership is not part of the wire shape.
    pub fn into_record(self, owner_id: Uuid) -> SignedRecord {
        SignedRecord {
            id: self.id,
            owner_id,
            title: self.title,
            envelope: self.envelope,
            signature: self.signature,
            created_at: self.created_at,
            version_marker: self.version_marker,
        }
    }
}

/// Body of an update request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    #[serde(flatten)]
    pub envelope: EncryptedEnvelope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        with = "crate::encoding::b64_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub signature: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_known_marker: Option<DateTime<Utc>>,
    #[serde(default)]
    pub force: bool,
}

impl From<&UpdateRequest> for UpdatePayload {
    fn from(request: &UpdateRequest) -> Self {
        let (last_known_marker, force) = match request.precondition {
            Precondition::IfUnchanged(marker) => (Some(marker), false),
            Precondition::Force => (None, true),
        };
        Self {
            envelope: request.envelope.clone(),
            title: request.title.clone(),
            signature: request.signature.clone(),
            last_known_marker,
            force,
        }
    }
}

impl TryFrom<UpdatePayload> for UpdateRequest {
    type Error = VaultError;

    fn try_from(payload: UpdatePayload) -> Result<Self> {
        let precondition = match (payload.force, payload.last_known_marker) {
            (true, _) => Precondition::Force,
            (false, Some(marker)) => Precondition::IfUnchanged(marker),
            (false, None) => {
                return Err(VaultError::InvalidInput(
                    "update needs lastKnownMarker or force: true".to_string(),
                ))
            }
        };

        Ok(UpdateRequest {
            title: payload.title,
            envelope: payload.envelope,
            signature: payload.signature,
            precondition,
        })
    }
}

/// Outcome of an update as reported to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UpdateResponse {
    #[serde(rename_all = "camelCase")]
    Conflict {
        conflict: bool,
        server_record: RecordWire,
    },
    #[serde(rename_all = "camelCase")]
    Applied { version_marker: DateTime<Utc> },
}

impl UpdateResponse {
    /// Turn a store's update result into a response, passing through any
    /// error that is not a conflict.
    pub fn from_result(result: Result<DateTime<Utc>>) -> Result<Self> {
        match result {
            Ok(version_marker) => Ok(Self::Applied { version_marker }),
            Err(VaultError::Conflict { server_record }) => Ok(Self::Conflict {
                conflict: true,
                server_record: RecordWire::from(server_record.as_ref()),
            }),
            Err(other) => Err(other),
        }
    }
}
