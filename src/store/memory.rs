//! In-memory record store.
//!
//! Useful for tests and for embedding the vault where persistence is
//! handled elsewhere. All data is lost on drop.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::record::{RecordId, RecordSummary, SecretKey, SecretRecord};
use super::RecordStore;
use crate::errors::{Result, TokenVaultError};

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<SecretKey, SecretRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across all tenants.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn records(&self) -> Result<MutexGuard<'_, HashMap<SecretKey, SecretRecord>>> {
        self.records
            .lock()
            .map_err(|_| TokenVaultError::storage("memory store poisoned"))
    }
}

impl RecordStore for MemoryStore {
    fn upsert(
        &self,
        key: &SecretKey,
        encoded_value: &str,
        now: DateTime<Utc>,
    ) -> Result<RecordId> {
        let mut records = self.records()?;
        let record = records
            .entry(key.clone())
            .and_modify(|r| {
                r.encoded_value = encoded_value.to_string();
                r.updated_at = now;
            })
            .or_insert_with(|| SecretRecord {
                id: RecordId::new(),
                key: key.clone(),
                encoded_value: encoded_value.to_string(),
                last_used_at: None,
                created_at: now,
                updated_at: now,
            });
        Ok(record.id)
    }

    fn encoded_value(&self, key: &SecretKey) -> Result<Option<String>> {
        Ok(self.records()?.get(key).map(|r| r.encoded_value.clone()))
    }

    fn exists(&self, key: &SecretKey) -> Result<bool> {
        Ok(self.records()?.contains_key(key))
    }

    fn touch(&self, key: &SecretKey, now: DateTime<Utc>) -> Result<()> {
        if let Some(r) = self.records()?.get_mut(key) {
            r.last_used_at = Some(now);
        }
        Ok(())
    }

    fn remove(&self, key: &SecretKey) -> Result<bool> {
        Ok(self.records()?.remove(key).is_some())
    }

    fn record(&self, key: &SecretKey) -> Result<Option<SecretRecord>> {
        Ok(self.records()?.get(key).cloned())
    }

    fn list(&self, tenant_id: &str) -> Result<Vec<RecordSummary>> {
        let mut list: Vec<RecordSummary> = self
            .records()?
            .values()
            .filter(|r| r.key.tenant_id() == tenant_id)
            .map(SecretRecord::summary)
            .collect();

        list.sort_by(|a, b| {
            (a.key.secret_class(), a.key.identifier())
                .cmp(&(b.key.secret_class(), b.key.identifier()))
        });
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_is_keyed_by_triple() {
        let store = MemoryStore::new();
        let k = SecretKey::new("t1", "email", "a@b.com").unwrap();

        let id1 = store.upsert(&k, "one", Utc::now()).unwrap();
        let id2 = store.upsert(&k, "two", Utc::now()).unwrap();

        assert_eq!(id1, id2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.encoded_value(&k).unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn remove_and_touch_on_missing_key() {
        let store = MemoryStore::new();
        let k = SecretKey::new("t1", "email", "a@b.com").unwrap();

        assert!(!store.remove(&k).unwrap());
        assert!(store.touch(&k, Utc::now()).is_ok());
        assert!(store.is_empty());
    }
}
