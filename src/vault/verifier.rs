//! The verification vault: salted one-way verifiers for tenant secrets.
//!
//! `CredentialVault` never persists or returns plaintext. Callers hand a
//! secret in on `store` and later ask whether a candidate matches it.
//!
//! Per key, a record is either absent or present. `store` is the only
//! transition into present, `delete` the only one out. `verify` and
//! `check` never change state; a successful `verify` only bumps
//! `last_used_at`.

use chrono::Utc;
use zeroize::Zeroizing;

use crate::crypto::hasher::{generate_salt, SecretHasher, Sha256Hasher};
use crate::crypto::keys::{VaultKey, KEY_LEN};
use crate::crypto::constant_time_eq;
use crate::errors::Result;
use crate::store::record::validate_tenant_id;
use crate::store::{RecordId, RecordStore, RecordSummary, SecretKey};

use super::format;
use super::validate_plaintext;

pub struct CredentialVault<S> {
    store: S,
    hasher: Box<dyn SecretHasher>,
    pepper: Zeroizing<[u8; KEY_LEN]>,
}

impl<S: RecordStore> CredentialVault<S> {
    /// Build a vault over `store`, deriving the hash pepper from `key`.
    pub fn new(store: S, key: &VaultKey, hasher: Box<dyn SecretHasher>) -> Result<Self> {
        Ok(Self {
            store,
            hasher,
            pepper: key.derive_pepper()?,
        })
    }

    /// Build a vault with the single-pass SHA-256 hasher.
    pub fn with_default_hasher(store: S, key: &VaultKey) -> Result<Self> {
        Self::new(store, key, Box::new(Sha256Hasher))
    }

    /// Store (or replace) the verifier for a secret.
    ///
    /// A fresh salt is drawn on every call, so re-storing the same
    /// plaintext produces a different encoded value under the same id.
    pub fn store(
        &self,
        tenant_id: &str,
        secret_class: &str,
        identifier: &str,
        plaintext: &str,
    ) -> Result<RecordId> {
        let key = SecretKey::new(tenant_id, secret_class, identifier)?;
        validate_plaintext(plaintext)?;

        let salt = generate_salt();
        let hash = self.hasher.hash(plaintext.as_bytes(), &self.pepper[..], &salt)?;
        let encoded = format::encode_verifier(&salt, &hash);

        let id = self.store.upsert(&key, &encoded, Utc::now())?;

        tracing::info!(
            record_id = %id,
            tenant_id = key.tenant_id(),
            secret_class = key.secret_class(),
            hasher = self.hasher.name(),
            "secret verifier stored"
        );
        Ok(id)
    }

    /// Check a candidate against the stored verifier.
    ///
    /// Returns `false` when no record exists: "no secret configured" and
    /// "wrong secret" look the same from here.
    pub fn verify(
        &self,
        tenant_id: &str,
        secret_class: &str,
        identifier: &str,
        candidate: &str,
    ) -> Result<bool> {
        let key = SecretKey::new(tenant_id, secret_class, identifier)?;

        let Some(encoded) = self.store.encoded_value(&key)? else {
            tracing::debug!(
                tenant_id = key.tenant_id(),
                secret_class = key.secret_class(),
                "verify: no record"
            );
            return Ok(false);
        };
        if candidate.is_empty() {
            return Ok(false);
        }

        let verifier = format::decode_verifier(&encoded)?;
        let recomputed = self
            .hasher
            .hash(candidate.as_bytes(), &self.pepper[..], &verifier.salt)?;
        let valid = constant_time_eq(&recomputed, &verifier.hash);

        if valid {
            // Best-effort: a lost last_used_at update never fails a match.
            if let Err(e) = self.store.touch(&key, Utc::now()) {
                tracing::warn!(
                    tenant_id = key.tenant_id(),
                    secret_class = key.secret_class(),
                    error = %e,
                    "could not record last use"
                );
            }
        }

        tracing::debug!(
            tenant_id = key.tenant_id(),
            secret_class = key.secret_class(),
            valid,
            "verify"
        );
        Ok(valid)
    }

    /// Whether a verifier exists. Never touches `last_used_at`.
    pub fn check(&self, tenant_id: &str, secret_class: &str, identifier: &str) -> Result<bool> {
        let key = SecretKey::new(tenant_id, secret_class, identifier)?;
        self.store.exists(&key)
    }

    /// Remove a verifier. Deleting an absent record is not an error.
    pub fn delete(&self, tenant_id: &str, secret_class: &str, identifier: &str) -> Result<()> {
        let key = SecretKey::new(tenant_id, secret_class, identifier)?;
        let existed = self.store.remove(&key)?;
        tracing::info!(
            tenant_id = key.tenant_id(),
            secret_class = key.secret_class(),
            existed,
            "secret verifier deleted"
        );
        Ok(())
    }

    /// Metadata for every verifier a tenant has.
    pub fn list(&self, tenant_id: &str) -> Result<Vec<RecordSummary>> {
        validate_tenant_id(tenant_id)?;
        self.store.list(tenant_id)
    }

    pub fn hasher_name(&self) -> &'static str {
        self.hasher.name()
    }

    /// The underlying record store.
    pub fn backend(&self) -> &S {
        &self.store
    }
}
