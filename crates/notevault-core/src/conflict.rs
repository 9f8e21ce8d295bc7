//! Optimistic-concurrency update protocol.
//!
//! A client remembers the `version_marker` it last saw. An update carries
//! that marker as [`Precondition::IfUnchanged`]; the store applies it only
//! if the record's current marker is exactly equal, then advances the marker.
//! On mismatch the caller gets [`VaultError::Conflict`] with the current
//! record so it can merge, overwrite or give up.
//!
//! Overwriting without a marker is [`Precondition::Force`], which has to be
//! asked for by name. There is no "no marker means anything goes" default.
//!
//! Atomicity of compare-and-swap is the store's job (see
//! [`crate::storage::SqliteStore`]); the resolver only decides.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::crypto::EncryptedEnvelope;
use crate::error::{Result, VaultError};
use crate::storage::types::{normalize_title, SignedRecord};

/// What the writer believes about the record it is replacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Apply only if the current marker equals this one exactly.
    IfUnchanged(DateTime<Utc>),
    /// Apply unconditionally.
    Force,
}

/// A replacement body for an existing record.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    /// New title; `None` keeps the current one
    pub title: Option<String>,
    pub envelope: EncryptedEnvelope,
    pub signature: Option<Vec<u8>>,
    pub precondition: Precondition,
}

impl UpdateRequest {
    /// An update that only applies if the record is still at `last_known`.
    pub fn guarded(
        envelope: EncryptedEnvelope,
        signature: Option<Vec<u8>>,
        last_known: DateTime<Utc>,
    ) -> Self {
        Self {
            title: None,
            envelope,
            signature,
            precondition: Precondition::IfUnchanged(last_known),
        }
    }

    /// An update that overwrites whatever is stored.
    pub fn forced(envelope: EncryptedEnvelope, signature: Option<Vec<u8>>) -> Self {
        Self {
            title: None,
            envelope,
            signature,
            precondition: Precondition::Force,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn is_forced(&self) -> bool {
        matches!(self.precondition, Precondition::Force)
    }
}

/// Decides whether an update may replace a record, and what the replacement looks like.
#[derive(Debug, Clone, Default)]
pub struct ConflictResolver<C: Clock = SystemClock> {
    clock: C,
}

impl<C: Clock> ConflictResolver<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Compare the precondition against the record as currently stored.
    pub fn check(&self, current: &SignedRecord, precondition: &Precondition) -> Result<()> {
        match precondition {
            Precondition::Force => {
                debug!(record_id = %current.id, "forced overwrite, skipping marker check");
                Ok(())
            }
            Precondition::IfUnchanged(last_known) if *last_known == current.version_marker => {
                Ok(())
            }
            Precondition::IfUnchanged(last_known) => {
                warn!(
                    record_id = %current.id,
                    client_marker = %last_known,
                    server_marker = %current.version_marker,
                    "version marker mismatch"
                );
                Err(VaultError::Conflict {
                    server_record: Box::new(current.clone()),
                })
            }
        }
    }

    /// The marker for a write following `previous`: the current time, but
    /// always strictly later than `previous` even if the clock stalls or
    /// steps backwards.
    pub fn next_marker(&self, previous: DateTime<Utc>) -> DateTime<Utc> {
        let now = self.clock.now();
        let floor = previous + Duration::microseconds(1);
        if now < floor {
            floor
        } else {
            now
        }
    }

    /// Check `request` against `current` and build the record that replaces it.
    pub fn apply(&self, current: &SignedRecord, request: &UpdateRequest) -> Result<SignedRecord> {
        self.check(current, &request.precondition)?;

        let title = match request.title.as_deref() {
            Some(title) => normalize_title(Some(title)),
            None => current.title.clone(),
        };

        Ok(SignedRecord {
            id: current.id,
            owner_id: current.owner_id,
            title,
            envelope: request.envelope.clone(),
            signature: request.signature.clone(),
            created_at: current.created_at,
            version_marker: self.next_marker(current.version_marker),
        })
    }
}
