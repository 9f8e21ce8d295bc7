//! The unlocked-vault session.
//!
//! A [`VaultSession`] starts `Locked`, holding nothing but the bearer
//! credential for its record store and whatever opaque records it has
//! fetched. [`VaultSession::unlock`] moves it through `Unlocking` to
//! `Unlocked`, where the account identity and password are resident and
//! records can be sealed, signed, opened and verified. [`VaultSession::logout`]
//! drops both and returns to `Locked`.
//!
//! Bulk decryption is a partial-failure batch: every record gets its own
//! [`RecordOutcome`] and one bad record never fails the call.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::conflict::UpdateRequest;
use crate::crypto::{
    open_with_password, seal_with_password, Credential, EncryptedEnvelope, Identity, PublicIdentity,
    WrappedIdentity,
};
use crate::error::{Result, VaultError};
use crate::storage::types::{NewRecord, SignedRecord};

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Locked,
    Unlocking,
    Unlocked,
}

/// Opaque credential presented to the record store.
pub struct BearerToken(SecretString);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

struct Resident {
    identity: Identity,
    credential: Credential,
}

enum State {
    Locked,
    Unlocking,
    Unlocked(Box<Resident>),
}

/// What happened to one record in a batch.
pub enum RecordOutcome {
    /// The envelope opened. `verified` is false for unsigned records and for
    /// signatures that do not match the session's public key.
    Decrypted {
        plaintext: Zeroizing<String>,
        verified: bool,
    },
    /// The envelope did not open under the supplied password.
    Undecryptable { reason: VaultError },
}

impl std::fmt::Debug for RecordOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decrypted { verified, .. } => f
                .debug_struct("Decrypted")
                .field("plaintext", &"[REDACTED]")
                .field("verified", verified)
                .finish(),
            Self::Undecryptable { reason } => f
                .debug_struct("Undecryptable")
                .field("reason", reason)
                .finish(),
        }
    }
}

/// A record together with its batch outcome.
#[derive(Debug)]
pub struct OpenedRecord {
    pub record: SignedRecord,
    pub outcome: RecordOutcome,
}

impl OpenedRecord {
    pub fn is_decrypted(&self) -> bool {
        matches!(self.outcome, RecordOutcome::Decrypted { .. })
    }

    pub fn is_verified(&self) -> bool {
        matches!(self.outcome, RecordOutcome::Decrypted { verified: true, .. })
    }

    pub fn plaintext(&self) -> Option<&str> {
        match &self.outcome {
            RecordOutcome::Decrypted { plaintext, .. } => Some(plaintext.as_str()),
            RecordOutcome::Undecryptable { .. } => None,
        }
    }
}

fn open_record(
    record: &SignedRecord,
    password: &Credential,
    public: &PublicIdentity,
) -> RecordOutcome {
    let bytes = match open_with_password(&record.envelope, password) {
        Ok(bytes) => bytes,
        Err(reason) => return RecordOutcome::Undecryptable { reason },
    };
    // Signatures cover the raw bytes; a body that is not valid UTF-8 is
    // still shown, with replacement characters.
    let verified = record
        .signature
        .as_deref()
        .is_some_and(|signature| public.verify(&bytes, signature));
    let plaintext = Zeroizing::new(String::from_utf8_lossy(&bytes).into_owned());

    RecordOutcome::Decrypted {
        plaintext,
        verified,
    }
}

/// One user's vault session.
pub struct VaultSession {
    bearer: BearerToken,
    records: Vec<SignedRecord>,
    state: State,
}

impl VaultSession {
    /// A locked session with no records loaded.
    pub fn new(bearer: BearerToken) -> Self {
        Self {
            bearer,
            records: Vec::new(),
            state: State::Locked,
        }
    }

    pub fn state(&self) -> SessionState {
        match self.state {
            State::Locked => SessionState::Locked,
            State::Unlocking => SessionState::Unlocking,
            State::Unlocked(_) => SessionState::Unlocked,
        }
    }

    pub fn bearer(&self) -> &BearerToken {
        &self.bearer
    }

    /// Records as last loaded; still ciphertext.
    pub fn records(&self) -> &[SignedRecord] {
        &self.records
    }

    pub fn set_records(&mut self, records: Vec<SignedRecord>) {
        debug!(count = records.len(), "loaded records");
        self.records = records;
    }

    fn resident(&self) -> Result<&Resident> {
        match &self.state {
            State::Unlocked(resident) => Ok(resident),
            State::Locked | State::Unlocking => Err(VaultError::Locked),
        }
    }

    /// Unwrap the account identity with `password`.
    ///
    /// On failure the session is `Locked` and the error is
    /// [`VaultError::WrongPassword`]. Unlocking an unlocked session first
    /// discards the resident identity.
    pub fn unlock(&mut self, wrapped: &WrappedIdentity, password: Credential) -> Result<()> {
        self.state = State::Unlocking;
        debug!("session unlocking");

        match Identity::unwrap_from(wrapped, &password) {
            Ok(identity) => {
                self.state = State::Unlocked(Box::new(Resident {
                    identity,
                    credential: password,
                }));
                info!("session unlocked");
                Ok(())
            }
            Err(err) => {
                self.state = State::Locked;
                warn!("unlock failed");
                Err(err)
            }
        }
    }

    /// Public half of the resident identity.
    pub fn public_identity(&self) -> Result<&PublicIdentity> {
        Ok(self.resident()?.identity.public())
    }

    fn seal_and_sign(&self, plaintext: &str) -> Result<(EncryptedEnvelope, Vec<u8>)> {
        let resident = self.resident()?;
        let envelope = seal_with_password(plaintext.as_bytes(), &resident.credential)?;
        let signature = resident.identity.sign(plaintext.as_bytes())?;
        Ok((envelope, signature))
    }

    /// Seal `plaintext` under a fresh salt and sign it, ready for
    /// [`crate::storage::RecordStore::create`].
    pub fn encrypt_and_sign(&self, title: Option<&str>, plaintext: &str) -> Result<NewRecord> {
        let (envelope, signature) = self.seal_and_sign(plaintext)?;
        Ok(NewRecord::new(title, envelope).with_signature(signature))
    }

    /// Seal and sign a replacement body that applies only at `last_known`.
    pub fn seal_update(&self, plaintext: &str, last_known: DateTime<Utc>) -> Result<UpdateRequest> {
        let (envelope, signature) = self.seal_and_sign(plaintext)?;
        Ok(UpdateRequest::guarded(envelope, Some(signature), last_known))
    }

    /// Seal and sign a replacement body that overwrites unconditionally.
    pub fn seal_forced_update(&self, plaintext: &str) -> Result<UpdateRequest> {
        let (envelope, signature) = self.seal_and_sign(plaintext)?;
        Ok(UpdateRequest::forced(envelope, Some(signature)))
    }

    /// Open and verify every record, each independently.
    ///
    /// Results are in input order. The only error is [`VaultError::Locked`];
    /// per-record failures are reported in each [`OpenedRecord`].
    pub fn decrypt_and_verify_all(
        &self,
        records: &[SignedRecord],
        password: &Credential,
    ) -> Result<Vec<OpenedRecord>> {
        let public = self.resident()?.identity.public();

        let opened: Vec<OpenedRecord> = records
            .par_iter()
            .map(|record| OpenedRecord {
                record: record.clone(),
                outcome: open_record(record, password, public),
            })
            .collect();

        let decrypted = opened.iter().filter(|r| r.is_decrypted()).count();
        let verified = opened.iter().filter(|r| r.is_verified()).count();
        info!(total = opened.len(), decrypted, verified, "decrypted batch");
        Ok(opened)
    }

    /// [`Self::decrypt_and_verify_all`] over the loaded records with the
    /// session's own password.
    pub fn decrypt_loaded(&self) -> Result<Vec<OpenedRecord>> {
        let resident = self.resident()?;
        self.decrypt_and_verify_all(&self.records, &resident.credential)
    }

    /// Drop the identity and password and return to `Locked`.
    pub fn logout(&mut self) {
        if matches!(self.state, State::Unlocked(_)) {
            info!("session locked");
        }
        self.state = State::Locked;
    }
}
