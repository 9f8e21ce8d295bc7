//! SQLite record and account store.
//!
//! Holds ciphertext, signatures and wrapped identities only. Updates run
//! inside an immediate transaction so the marker check and the write are one
//! step, both across threads sharing a store and across processes sharing
//! the file.

mod row;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};
use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::conflict::{ConflictResolver, UpdateRequest};
use crate::encoding;
use crate::error::{Result, VaultError};
use crate::storage::traits::{AccountStore, RecordStore};
use crate::storage::types::{Account, NewRecord, SignedRecord};

use row::{format_timestamp, AccountRow, RecordRow, ACCOUNT_COLUMNS, RECORD_COLUMNS};

const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS accounts (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    public_key TEXT NOT NULL,
    wrapped_private_key TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS records (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    title TEXT NOT NULL,
    envelope_json TEXT NOT NULL,
    signature TEXT,
    created_at TEXT NOT NULL,
    version_marker TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_records_owner ON records(owner_id, version_marker);
"#;

/// SQLite-backed [`RecordStore`] and [`AccountStore`].
pub struct SqliteStore {
    conn: Mutex<Connection>,
    resolver: ConflictResolver<Arc<dyn Clock>>,
}

impl SqliteStore {
    /// Open (creating if needed) a store file.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened record store");
        Self::from_connection(conn)
    }

    /// A throwaway store, mostly for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('schema_version', ?1)",
            [SCHEMA_VERSION.to_string()],
        )?;

        let version: String = conn.query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )?;
        if version != SCHEMA_VERSION.to_string() {
            return Err(VaultError::Storage(format!(
                "Unsupported schema version {} (expected {})",
                version, SCHEMA_VERSION
            )));
        }

        Ok(Self {
            conn: Mutex::new(conn),
            resolver: ConflictResolver::new(Arc::new(SystemClock)),
        })
    }

    /// Replace the clock used for version markers.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.resolver = ConflictResolver::new(clock);
        self
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| VaultError::Storage("SQLite connection poisoned".to_string()))
    }

    /// Look a record up by id alone, then apply the ownership rule.
    fn fetch_owned(conn: &Connection, owner: Uuid, id: Uuid) -> Result<SignedRecord> {
        let sql = format!("SELECT {} FROM records WHERE id = ?1", RECORD_COLUMNS);
        let row = conn
            .query_row(&sql, [id.to_string()], RecordRow::from_row)
            .optional()?
            .ok_or(VaultError::NotFound(id))?;

        let record = SignedRecord::try_from(row)?;
        if record.owner_id != owner {
            return Err(VaultError::Forbidden(id));
        }
        Ok(record)
    }

    fn query_account(&self, column: &str, value: &str) -> Result<Option<Account>> {
        let conn = self.lock_conn()?;
        let sql = format!("SELECT {} FROM accounts WHERE {} = ?1", ACCOUNT_COLUMNS, column);
        conn.query_row(&sql, [value], AccountRow::from_row)
            .optional()?
            .map(Account::try_from)
            .transpose()
    }
}

impl RecordStore for SqliteStore {
    fn create(&self, owner: Uuid, record: &NewRecord) -> Result<SignedRecord> {
        let now = self.resolver.clock().now();
        let stored = SignedRecord {
            id: Uuid::now_v7(),
            owner_id: owner,
            title: record.title.clone(),
            envelope: record.envelope.clone(),
            signature: record.signature.clone(),
            created_at: now,
            version_marker: now,
        };

        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO records (id, owner_id, title, envelope_json, signature, created_at, version_marker)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                stored.id.to_string(),
                owner.to_string(),
                stored.title,
                stored.envelope.to_json()?,
                stored.signature.as_deref().map(encoding::encode),
                format_timestamp(&stored.created_at),
                format_timestamp(&stored.version_marker),
            ],
        )?;

        info!(record_id = %stored.id, "created record");
        Ok(stored)
    }

    fn list(&self, owner: Uuid) -> Result<Vec<SignedRecord>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM records WHERE owner_id = ?1 ORDER BY version_marker DESC, id DESC",
            RECORD_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([owner.to_string()], RecordRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(SignedRecord::try_from(row?)?);
        }
        Ok(records)
    }

    fn fetch(&self, owner: Uuid, id: Uuid) -> Result<SignedRecord> {
        let conn = self.lock_conn()?;
        Self::fetch_owned(&conn, owner, id)
    }

    fn update(&self, owner: Uuid, id: Uuid, request: &UpdateRequest) -> Result<DateTime<Utc>> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = Self::fetch_owned(&tx, owner, id)?;
        let updated = self.resolver.apply(&current, request)?;

        let changed = tx.execute(
            r#"
            UPDATE records
            SET title = ?1, envelope_json = ?2, signature = ?3, version_marker = ?4
            WHERE id = ?5 AND owner_id = ?6 AND version_marker = ?7
            "#,
            params![
                updated.title,
                updated.envelope.to_json()?,
                updated.signature.as_deref().map(encoding::encode),
                format_timestamp(&updated.version_marker),
                id.to_string(),
                owner.to_string(),
                format_timestamp(&current.version_marker),
            ],
        )?;
        if changed != 1 {
            return Err(VaultError::Storage(format!(
                "Record {} changed during update",
                id
            )));
        }
        tx.commit()?;

        info!(
            record_id = %id,
            version_marker = %updated.version_marker,
            forced = request.is_forced(),
            "updated record"
        );
        Ok(updated.version_marker)
    }

    fn delete(&self, owner: Uuid, id: Uuid) -> Result<()> {
        let conn = self.lock_conn()?;
        Self::fetch_owned(&conn, owner, id)?;
        conn.execute(
            "DELETE FROM records WHERE id = ?1 AND owner_id = ?2",
            params![id.to_string(), owner.to_string()],
        )?;
        info!(record_id = %id, "deleted record");
        Ok(())
    }
}

impl AccountStore for SqliteStore {
    fn put_account(&self, account: &Account) -> Result<()> {
        let conn = self.lock_conn()?;
        let result = conn.execute(
            r#"
            INSERT INTO accounts (id, name, public_key, wrapped_private_key, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                account.id.to_string(),
                account.name,
                account.identity.public_key,
                account.identity.wrapped_private_key,
                format_timestamp(&account.created_at),
            ],
        );

        match result {
            Ok(_) => {
                info!(account_id = %account.id, "stored account");
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(VaultError::InvalidInput(format!(
                    "Account '{}' already exists",
                    account.name
                )))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
        self.query_account("id", &id.to_string())
    }

    fn find_account(&self, name: &str) -> Result<Option<Account>> {
        self.query_account("name", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::conflict::Precondition;
    use crate::crypto::{EncryptedEnvelope, WrappedIdentity};
    use chrono::TimeZone;

    fn envelope(byte: u8) -> EncryptedEnvelope {
        EncryptedEnvelope {
            ciphertext: vec![byte; 32],
            iv: [byte; 12],
            salt: [byte; 16],
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    fn store_with_clock() -> (SqliteStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        let store = SqliteStore::open_in_memory()
            .unwrap()
            .with_clock(clock.clone());
        (store, clock)
    }

    #[test]
    fn test_create_and_fetch() {
        let (store, _) = store_with_clock();
        let owner = Uuid::new_v4();

        let created = store
            .create(owner, &NewRecord::new(None, envelope(1)).with_signature(vec![4; 8]))
            .unwrap();
        assert_eq!(created.title, "Untitled");
        assert_eq!(created.version_marker, start());

        let fetched = store.fetch(owner, created.id).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_fetch_distinguishes_missing_from_foreign() {
        let (store, _) = store_with_clock();
        let owner = Uuid::new_v4();
        let created = store
            .create(owner, &NewRecord::new(Some("Mine"), envelope(1)))
            .unwrap();

        assert!(matches!(
            store.fetch(Uuid::new_v4(), created.id),
            Err(VaultError::Forbidden(_))
        ));
        assert!(matches!(
            store.fetch(owner, Uuid::new_v4()),
            Err(VaultError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_is_owner_scoped_and_newest_first() {
        let (store, clock) = store_with_clock();
        let owner = Uuid::new_v4();

        let first = store.create(owner, &NewRecord::new(Some("a"), envelope(1))).unwrap();
        clock.advance(chrono::Duration::seconds(1));
        let second = store.create(owner, &NewRecord::new(Some("b"), envelope(2))).unwrap();
        store
            .create(Uuid::new_v4(), &NewRecord::new(Some("other"), envelope(3)))
            .unwrap();

        let ids: Vec<Uuid> = store.list(owner).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        // Touching the older record moves it to the front.
        clock.advance(chrono::Duration::seconds(1));
        store
            .update(owner, first.id, &UpdateRequest::guarded(envelope(9), None, first.version_marker))
            .unwrap();
        let ids: Vec<Uuid> = store.list(owner).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn test_update_keeps_title_when_absent() {
        let (store, clock) = store_with_clock();
        let owner = Uuid::new_v4();
        let created = store
            .create(owner, &NewRecord::new(Some("Journal"), envelope(1)))
            .unwrap();

        clock.advance(chrono::Duration::seconds(1));
        let marker = store
            .update(
                owner,
                created.id,
                &UpdateRequest::guarded(envelope(2), None, created.version_marker),
            )
            .unwrap();

        let stored = store.fetch(owner, created.id).unwrap();
        assert_eq!(stored.title, "Journal");
        assert_eq!(stored.version_marker, marker);
        assert_eq!(stored.envelope, envelope(2));
        assert!(stored.signature.is_none());
    }

    #[test]
    fn test_stale_update_leaves_record_untouched() {
        let (store, clock) = store_with_clock();
        let owner = Uuid::new_v4();
        let created = store.create(owner, &NewRecord::new(None, envelope(1))).unwrap();

        clock.advance(chrono::Duration::seconds(1));
        store
            .update(owner, created.id, &UpdateRequest::guarded(envelope(2), None, created.version_marker))
            .unwrap();
        let after_first = store.fetch(owner, created.id).unwrap();

        let stale = UpdateRequest::guarded(envelope(3), None, created.version_marker);
        match store.update(owner, created.id, &stale) {
            Err(VaultError::Conflict { server_record }) => {
                assert_eq!(*server_record, after_first)
            }
            other => panic!("expected conflict, got {:?}", other),
        }
        assert_eq!(store.fetch(owner, created.id).unwrap(), after_first);
    }

    #[test]
    fn test_update_by_other_owner_is_forbidden() {
        let (store, _) = store_with_clock();
        let owner = Uuid::new_v4();
        let created = store.create(owner, &NewRecord::new(None, envelope(1))).unwrap();

        let request = UpdateRequest {
            title: None,
            envelope: envelope(2),
            signature: None,
            precondition: Precondition::Force,
        };
        assert!(matches!(
            store.update(Uuid::new_v4(), created.id, &request),
            Err(VaultError::Forbidden(_))
        ));
        assert!(matches!(
            store.delete(Uuid::new_v4(), created.id),
            Err(VaultError::Forbidden(_))
        ));
    }

    #[test]
    fn test_delete() {
        let (store, _) = store_with_clock();
        let owner = Uuid::new_v4();
        let created = store.create(owner, &NewRecord::new(None, envelope(1))).unwrap();

        store.delete(owner, created.id).unwrap();
        assert!(matches!(
            store.fetch(owner, created.id),
            Err(VaultError::NotFound(_))
        ));
        assert!(matches!(
            store.delete(owner, created.id),
            Err(VaultError::NotFound(_))
        ));
    }

    #[test]
    fn test_accounts() {
        let (store, _) = store_with_clock();
        let account = Account::new(
            "alice",
            WrappedIdentity {
                public_key: "cHVi".to_string(),
                wrapped_private_key: "{}".to_string(),
            },
        );
        store.put_account(&account).unwrap();

        assert_eq!(store.get_account(account.id).unwrap(), Some(account.clone()));
        assert_eq!(store.find_account("alice").unwrap(), Some(account.clone()));
        assert!(store.get_account(Uuid::new_v4()).unwrap().is_none());

        let duplicate = Account::new("alice", account.identity.clone());
        assert!(matches!(
            store.put_account(&duplicate),
            Err(VaultError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_reopen_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.db");
        let owner = Uuid::new_v4();

        let created = {
            let store = SqliteStore::open(&path).unwrap();
            store.create(owner, &NewRecord::new(Some("kept"), envelope(5))).unwrap()
        };

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.fetch(owner, created.id).unwrap(), created);
    }
}
