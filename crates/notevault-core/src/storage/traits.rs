//! Storage trait definitions.
//!
//! `RecordStore` is the server side of the vault: it holds ciphertext and
//! signatures, scopes everything by owner, and enforces the version-marker
//! protocol on update. `AccountStore` holds wrapped identities. A store never
//! sees a password or a plaintext body.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::{Account, NewRecord, SignedRecord};
use crate::conflict::UpdateRequest;
use crate::error::Result;

/// Owner-scoped store of encrypted records.
///
/// All implementations must ensure:
/// - A record is only visible to, and writable by, its owner
/// - `update` is an atomic compare-and-swap on the version marker
/// - Markers strictly increase across successive writes of one record
pub trait RecordStore: Send + Sync {
    /// Persist a new record for `owner`.
    ///
    /// The store assigns the id; `created_at` and `version_marker` are both
    /// set to the store's current time.
    ///
    /// # Returns
    ///
    /// Returns the record as stored.
    fn create(&self, owner: Uuid, record: &NewRecord) -> Result<SignedRecord>;

    /// List every record owned by `owner`.
    ///
    /// Records are returned newest marker first.
    fn list(&self, owner: Uuid) -> Result<Vec<SignedRecord>>;

    /// Get a single record.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotFound` if no record has this id, and
    /// `VaultError::Forbidden` if it exists under another owner.
    fn fetch(&self, owner: Uuid, id: Uuid) -> Result<SignedRecord>;

    /// Replace a record's body, subject to its precondition.
    ///
    /// A `None` title in the request keeps the stored title.
    ///
    /// # Returns
    ///
    /// Returns the new version marker.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Conflict` carrying the stored record if the
    /// precondition marker does not match exactly, plus the errors of
    /// [`RecordStore::fetch`].
    fn update(&self, owner: Uuid, id: Uuid, request: &UpdateRequest) -> Result<DateTime<Utc>>;

    /// Delete a record.
    ///
    /// # Errors
    ///
    /// Same as [`RecordStore::fetch`].
    fn delete(&self, owner: Uuid, id: Uuid) -> Result<()>;
}

/// Store of accounts and their wrapped identities.
pub trait AccountStore: Send + Sync {
    /// Insert an account.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidInput` if the id or name is taken.
    fn put_account(&self, account: &Account) -> Result<()>;

    /// Get an account by id.
    ///
    /// Returns `Ok(None)` if not found.
    fn get_account(&self, id: Uuid) -> Result<Option<Account>>;

    /// Get an account by name.
    fn find_account(&self, name: &str) -> Result<Option<Account>>;
}
