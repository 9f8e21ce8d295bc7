//! Record and account storage.
//!
//! The traits describe what a vault server must do; `SqliteStore` is the
//! bundled implementation. `wire` holds the JSON shapes a remote store
//! would speak.

pub mod sqlite;
pub mod traits;
pub mod types;
pub mod wire;

pub use sqlite::SqliteStore;
pub use traits::{AccountStore, RecordStore};
pub use types::{normalize_title, Account, NewRecord, SignedRecord, DEFAULT_TITLE};
pub use wire::{RecordWire, UpdatePayload, UpdateResponse};
