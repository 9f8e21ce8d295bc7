//! JSON output formatting for notes.

use notevault_core::storage::RecordWire;
use notevault_core::{OpenedRecord, RecordOutcome, SignedRecord};

/// Stored notes as their wire shape (ciphertext, no plaintext).
pub fn records_json(records: &[SignedRecord]) -> Vec<RecordWire> {
    records.iter().map(RecordWire::from).collect()
}

/// Convert a decrypted note to JSON for output.
pub fn opened_json(opened: &OpenedRecord) -> serde_json::Value {
    let (body, error) = match &opened.outcome {
        RecordOutcome::Decrypted { plaintext, .. } => (Some(plaintext.as_str()), None),
        RecordOutcome::Undecryptable { reason } => (None, Some(reason.to_string())),
    };
    serde_json::json!({
        "id": opened.record.id,
        "title": opened.record.title,
        "createdAt": opened.record.created_at,
        "versionMarker": opened.record.version_marker,
        "isDecrypted": opened.is_decrypted(),
        "isVerified": opened.is_verified(),
        "body": body,
        "error": error,
    })
}

/// Convert a batch of decrypted notes to a JSON array for output.
pub fn opened_list_json(opened: &[OpenedRecord]) -> Vec<serde_json::Value> {
    opened.iter().map(opened_json).collect()
}
