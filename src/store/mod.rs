//! Storage adapter: persistence of records keyed by
//! `(tenant_id, secret_class, identifier)`.
//!
//! This module provides:
//! - `SecretKey`, `SecretRecord` and `RecordSummary` (`record`)
//! - The `RecordStore` trait the vaults are written against
//! - `SqliteStore`, the production backend (`sqlite`)
//! - `MemoryStore`, an in-process backend for tests and embedding (`memory`)

pub mod memory;
pub mod record;
pub mod sqlite;

use chrono::{DateTime, Utc};

use crate::errors::Result;

pub use memory::MemoryStore;
pub use record::{RecordId, RecordSummary, SecretKey, SecretRecord};
pub use sqlite::{RecordTable, SqliteStore};

/// Abstraction over record persistence.
///
/// Values are opaque strings to the backend. Every method is a single
/// request/response unit; implementations must not hold locks across calls.
pub trait RecordStore: Send + Sync {
    /// Insert or replace the value at `key`, atomically.
    ///
    /// A new record gets a fresh id and `created_at = now`. An existing
    /// record keeps its id and `created_at`, and gets `updated_at = now`.
    /// On failure nothing is changed.
    fn upsert(&self, key: &SecretKey, encoded_value: &str, now: DateTime<Utc>)
        -> Result<RecordId>;

    /// Fetch only the encoded value at `key`.
    fn encoded_value(&self, key: &SecretKey) -> Result<Option<String>>;

    /// Whether a record exists at `key`.
    fn exists(&self, key: &SecretKey) -> Result<bool>;

    /// Set `last_used_at = now`. A missing record is not an error.
    fn touch(&self, key: &SecretKey, now: DateTime<Utc>) -> Result<()>;

    /// Remove the record at `key`. Returns `true` if it existed.
    fn remove(&self, key: &SecretKey) -> Result<bool>;

    /// Fetch the full record at `key`.
    fn record(&self, key: &SecretKey) -> Result<Option<SecretRecord>>;

    /// Metadata for all of a tenant's records, sorted by class then identifier.
    fn list(&self, tenant_id: &str) -> Result<Vec<RecordSummary>>;
}
