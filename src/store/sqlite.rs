//! SQLite-backed record store.
//!
//! Each vault gets its own table in the same database file:
//! `secret_verifiers` for one-way verifiers and `sealed_secrets` for
//! envelope-encrypted values. A UNIQUE constraint on the key triple makes
//! every write an atomic upsert.
//!
//! Calls are bounded by SQLite's busy timeout. Busy or locked databases
//! surface as retryable storage errors.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use super::record::{RecordId, RecordSummary, SecretKey, SecretRecord};
use super::RecordStore;
use crate::errors::{Result, TokenVaultError};

/// Which table a store instance reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTable {
    /// Salted one-way verifiers.
    Verifiers,
    /// Reversible, envelope-encrypted secrets.
    Sealed,
}

impl RecordTable {
    pub fn name(self) -> &'static str {
        match self {
            Self::Verifiers => "secret_verifiers",
            Self::Sealed => "sealed_secrets",
        }
    }
}

/// SQLite record store for one `RecordTable`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    table: RecordTable,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    ///
    /// `busy_timeout` bounds how long any single call waits on a locked
    /// database before failing.
    pub fn open(path: &Path, table: RecordTable, busy_timeout: Duration) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| storage_error("open database", &e))?;

        // Owner-only: the file holds salts, hashes and ciphertext.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        conn.busy_timeout(busy_timeout)
            .map_err(|e| storage_error("set busy timeout", &e))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA secure_delete=ON;")
            .map_err(|e| storage_error("pragma", &e))?;

        let store = Self {
            conn: Mutex::new(conn),
            table,
        };
        store.run_migrations()?;

        tracing::debug!(path = %path.display(), table = table.name(), "record store opened");
        Ok(store)
    }

    /// Open an in-memory database (for tests and embedding).
    pub fn open_in_memory(table: RecordTable) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| storage_error("open in-memory database", &e))?;
        let store = Self {
            conn: Mutex::new(conn),
            table,
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn table(&self) -> RecordTable {
        self.table
    }

    /// Create both record tables. Idempotent.
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;
        for table in [RecordTable::Verifiers, RecordTable::Sealed] {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {t} (
                    id            TEXT PRIMARY KEY,
                    tenant_id     TEXT NOT NULL,
                    secret_class  TEXT NOT NULL,
                    identifier    TEXT NOT NULL,
                    encoded_value TEXT NOT NULL,
                    last_used_at  TEXT,
                    created_at    TEXT NOT NULL,
                    updated_at    TEXT NOT NULL,
                    UNIQUE (tenant_id, secret_class, identifier)
                );",
                t = table.name()
            ))
            .map_err(|e| storage_error("migration", &e))?;
        }
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| TokenVaultError::storage("record store connection poisoned"))
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<SecretRecord> {
        let id_str: String = row.get(0)?;
        let tenant_id: String = row.get(1)?;
        let secret_class: String = row.get(2)?;
        let identifier: String = row.get(3)?;

        let id = RecordId::parse(&id_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
        let key = SecretKey::new(&tenant_id, &secret_class, &identifier)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;

        let last_used_at: Option<String> = row.get(5)?;
        Ok(SecretRecord {
            id,
            key,
            encoded_value: row.get(4)?,
            last_used_at: last_used_at.map(|s| parse_timestamp(5, &s)).transpose()?,
            created_at: parse_timestamp(6, &row.get::<_, String>(6)?)?,
            updated_at: parse_timestamp(7, &row.get::<_, String>(7)?)?,
        })
    }
}

impl RecordStore for SqliteStore {
    fn upsert(
        &self,
        key: &SecretKey,
        encoded_value: &str,
        now: DateTime<Utc>,
    ) -> Result<RecordId> {
        let conn = self.conn()?;
        let id: String = conn
            .query_row(
                &format!(
                    "INSERT INTO {t}
                        (id, tenant_id, secret_class, identifier, encoded_value,
                         last_used_at, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?6)
                     ON CONFLICT (tenant_id, secret_class, identifier) DO UPDATE SET
                        encoded_value = excluded.encoded_value,
                        updated_at    = excluded.updated_at
                     RETURNING id",
                    t = self.table.name()
                ),
                params![
                    RecordId::new().to_string(),
                    key.tenant_id(),
                    key.secret_class(),
                    key.identifier(),
                    encoded_value,
                    now.to_rfc3339(),
                ],
                |row| row.get(0),
            )
            .map_err(|e| storage_error("upsert", &e))?;

        RecordId::parse(&id)
    }

    fn encoded_value(&self, key: &SecretKey) -> Result<Option<String>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT encoded_value FROM {t}
                 WHERE tenant_id = ?1 AND secret_class = ?2 AND identifier = ?3",
                t = self.table.name()
            ),
            params![key.tenant_id(), key.secret_class(), key.identifier()],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| storage_error("read", &e))
    }

    fn exists(&self, key: &SecretKey) -> Result<bool> {
        let conn = self.conn()?;
        let found: Option<i64> = conn
            .query_row(
                &format!(
                    "SELECT 1 FROM {t}
                     WHERE tenant_id = ?1 AND secret_class = ?2 AND identifier = ?3",
                    t = self.table.name()
                ),
                params![key.tenant_id(), key.secret_class(), key.identifier()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| storage_error("exists", &e))?;
        Ok(found.is_some())
    }

    fn touch(&self, key: &SecretKey, now: DateTime<Utc>) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            &format!(
                "UPDATE {t} SET last_used_at = ?4
                 WHERE tenant_id = ?1 AND secret_class = ?2 AND identifier = ?3",
                t = self.table.name()
            ),
            params![
                key.tenant_id(),
                key.secret_class(),
                key.identifier(),
                now.to_rfc3339()
            ],
        )
        .map_err(|e| storage_error("touch", &e))?;
        Ok(())
    }

    fn remove(&self, key: &SecretKey) -> Result<bool> {
        let conn = self.conn()?;
        let affected = conn
            .execute(
                &format!(
                    "DELETE FROM {t}
                     WHERE tenant_id = ?1 AND secret_class = ?2 AND identifier = ?3",
                    t = self.table.name()
                ),
                params![key.tenant_id(), key.secret_class(), key.identifier()],
            )
            .map_err(|e| storage_error("delete", &e))?;
        Ok(affected > 0)
    }

    fn record(&self, key: &SecretKey) -> Result<Option<SecretRecord>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT id, tenant_id, secret_class, identifier, encoded_value,
                        last_used_at, created_at, updated_at
                 FROM {t}
                 WHERE tenant_id = ?1 AND secret_class = ?2 AND identifier = ?3",
                t = self.table.name()
            ),
            params![key.tenant_id(), key.secret_class(), key.identifier()],
            Self::row_to_record,
        )
        .optional()
        .map_err(|e| storage_error("read record", &e))
    }

    fn list(&self, tenant_id: &str) -> Result<Vec<RecordSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT id, tenant_id, secret_class, identifier, encoded_value,
                        last_used_at, created_at, updated_at
                 FROM {t}
                 WHERE tenant_id = ?1
                 ORDER BY secret_class, identifier",
                t = self.table.name()
            ))
            .map_err(|e| storage_error("list prepare", &e))?;

        let rows = stmt
            .query_map(params![tenant_id], Self::row_to_record)
            .map_err(|e| storage_error("list exec", &e))?;

        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row.map_err(|e| storage_error("list row", &e))?.summary());
        }
        Ok(summaries)
    }
}

/// Classify a rusqlite error. Lock contention (including an expired busy
/// timeout) is retryable; everything else is not.
fn storage_error(context: &str, err: &rusqlite::Error) -> TokenVaultError {
    match err {
        rusqlite::Error::SqliteFailure(e, _)
            if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) =>
        {
            TokenVaultError::transient_storage(format!("{context}: {err}"))
        }
        rusqlite::Error::FromSqlConversionFailure(..) => {
            TokenVaultError::MalformedRecord(format!("{context}: {err}"))
        }
        _ => TokenVaultError::storage(format!("{context}: {err}")),
    }
}

fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
