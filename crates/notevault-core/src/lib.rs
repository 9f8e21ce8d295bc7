//! # Notevault Core
//!
//! Core library for Notevault - an end-to-end encrypted, signed note vault.
//!
//! Notes are sealed and signed on the client; a record store only ever sees
//! ciphertext, signatures and a wrapped private key. Concurrent edits are
//! caught with version markers instead of being silently lost.
//!
//! ## Architecture
//!
//! - **crypto**: key derivation, envelopes, identities
//! - **session**: the `Locked → Unlocking → Unlocked` vault session
//! - **conflict**: the version-marker update protocol
//! - **storage**: store traits, wire shapes, and the SQLite store
//! - **account**: account registration
//! - **clock**: time source for version markers

pub mod account;
pub mod clock;
pub mod conflict;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod session;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use conflict::{ConflictResolver, Precondition, UpdateRequest};
pub use crypto::{Credential, EncryptedEnvelope, Identity, PublicIdentity, WrappedIdentity};
pub use error::{Result, VaultError};
pub use session::{BearerToken, OpenedRecord, RecordOutcome, SessionState, VaultSession};
pub use storage::{Account, AccountStore, NewRecord, RecordStore, SignedRecord, SqliteStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
