//! Sealed secrets: values that must be replayed to a third party.
//!
//! Mailbox passwords used for SMTP/IMAP logins cannot live in the
//! verification vault, since a one-way hash cannot be turned back into a
//! password. They live here instead, in their own table, encrypted with
//! AES-256-GCM under a per-record key derived from the vault key.

use std::sync::Arc;

use chrono::Utc;
use zeroize::Zeroizing;

use crate::crypto::encryption::{decrypt, encrypt};
use crate::crypto::keys::VaultKey;
use crate::errors::{Result, TokenVaultError};
use crate::store::{RecordId, RecordStore, SecretKey};

use super::format;
use super::validate_plaintext;

pub struct SealedStore<S> {
    store: S,
    key: Arc<VaultKey>,
}

impl<S: RecordStore> SealedStore<S> {
    pub fn new(store: S, key: Arc<VaultKey>) -> Self {
        Self { store, key }
    }

    /// Encrypt and store (or replace) a secret.
    pub fn seal(
        &self,
        tenant_id: &str,
        secret_class: &str,
        identifier: &str,
        plaintext: &str,
    ) -> Result<RecordId> {
        let key = SecretKey::new(tenant_id, secret_class, identifier)?;
        validate_plaintext(plaintext)?;

        let sealing_key = self.sealing_key(&key)?;
        let blob = encrypt(&sealing_key[..], plaintext.as_bytes())?;
        let id = self
            .store
            .upsert(&key, &format::encode_sealed(&blob), Utc::now())?;

        tracing::info!(
            record_id = %id,
            tenant_id = key.tenant_id(),
            secret_class = key.secret_class(),
            "sealed secret stored"
        );
        Ok(id)
    }

    /// Decrypt a stored secret. `None` if nothing is sealed under the key.
    pub fn reveal(
        &self,
        tenant_id: &str,
        secret_class: &str,
        identifier: &str,
    ) -> Result<Option<Zeroizing<String>>> {
        let key = SecretKey::new(tenant_id, secret_class, identifier)?;

        let Some(encoded) = self.store.encoded_value(&key)? else {
            return Ok(None);
        };
        let blob = format::decode_sealed(&encoded)?;
        let sealing_key = self.sealing_key(&key)?;
        let plaintext = decrypt(&sealing_key[..], &blob)?;

        let text = std::str::from_utf8(&plaintext).map_err(|_| {
            TokenVaultError::SerializationError("sealed value is not valid UTF-8".into())
        })?;
        let revealed = Zeroizing::new(text.to_owned());

        if let Err(e) = self.store.touch(&key, Utc::now()) {
            tracing::warn!(
                tenant_id = key.tenant_id(),
                secret_class = key.secret_class(),
                error = %e,
                "could not record last use"
            );
        }

        tracing::info!(
            tenant_id = key.tenant_id(),
            secret_class = key.secret_class(),
            "sealed secret revealed"
        );
        Ok(Some(revealed))
    }

    pub fn check(&self, tenant_id: &str, secret_class: &str, identifier: &str) -> Result<bool> {
        let key = SecretKey::new(tenant_id, secret_class, identifier)?;
        self.store.exists(&key)
    }

    /// Remove a sealed secret. Deleting an absent record is not an error.
    pub fn delete(&self, tenant_id: &str, secret_class: &str, identifier: &str) -> Result<()> {
        let key = SecretKey::new(tenant_id, secret_class, identifier)?;
        let existed = self.store.remove(&key)?;
        tracing::info!(
            tenant_id = key.tenant_id(),
            secret_class = key.secret_class(),
            existed,
            "sealed secret deleted"
        );
        Ok(())
    }

    pub fn backend(&self) -> &S {
        &self.store
    }

    fn sealing_key(&self, key: &SecretKey) -> Result<Zeroizing<[u8; 32]>> {
        self.key
            .derive_sealing_key(key.tenant_id(), key.secret_class(), key.identifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn sealed(byte: u8) -> SealedStore<MemoryStore> {
        SealedStore::new(MemoryStore::new(), Arc::new(VaultKey::new([byte; 32])))
    }

    #[test]
    fn seal_reveal_delete() {
        let s = sealed(1);
        s.seal("t1", "smtp", "a@b.com", "mail-pass").unwrap();

        assert!(s.check("t1", "smtp", "a@b.com").unwrap());
        assert_eq!(
            s.reveal("t1", "smtp", "a@b.com").unwrap().as_deref().map(String::as_str),
            Some("mail-pass")
        );

        s.delete("t1", "smtp", "a@b.com").unwrap();
        s.delete("t1", "smtp", "a@b.com").unwrap();
        assert!(s.reveal("t1", "smtp", "a@b.com").unwrap().is_none());
    }

    #[test]
    fn stored_value_is_not_plaintext() {
        let s = sealed(1);
        s.seal("t1", "smtp", "a@b.com", "mail-pass").unwrap();

        let k = SecretKey::new("t1", "smtp", "a@b.com").unwrap();
        let stored = s.backend().encoded_value(&k).unwrap().unwrap();
        assert!(!stored.contains("mail-pass"));
    }

    #[test]
    fn value_moved_to_another_key_does_not_decrypt() {
        let s = sealed(1);
        s.seal("t1", "smtp", "a@b.com", "mail-pass").unwrap();

        let from = SecretKey::new("t1", "smtp", "a@b.com").unwrap();
        let to = SecretKey::new("t2", "smtp", "a@b.com").unwrap();
        let stored = s.backend().encoded_value(&from).unwrap().unwrap();
        s.backend().upsert(&to, &stored, Utc::now()).unwrap();

        assert!(matches!(
            s.reveal("t2", "smtp", "a@b.com"),
            Err(TokenVaultError::DecryptionFailed)
        ));
    }

    #[test]
    fn reveal_touches_last_used() {
        let s = sealed(1);
        s.seal("t1", "smtp", "a@b.com", "mail-pass").unwrap();
        let k = SecretKey::new("t1", "smtp", "a@b.com").unwrap();
        assert!(s.backend().record(&k).unwrap().unwrap().last_used_at.is_none());

        s.reveal("t1", "smtp", "a@b.com").unwrap();
        assert!(s.backend().record(&k).unwrap().unwrap().last_used_at.is_some());
    }

    #[test]
    fn seal_validates_input() {
        let s = sealed(1);
        assert!(matches!(
            s.seal("t1", "smtp", "a@b.com", ""),
            Err(TokenVaultError::Validation(_))
        ));
        assert!(matches!(
            s.seal("t1", "smtp", "", "x"),
            Err(TokenVaultError::Validation(_))
        ));
    }
}
