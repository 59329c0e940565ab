//! Deployment key material and HKDF-SHA256 sub-key derivation.
//!
//! A single 32-byte vault key is loaded once at process start. From it
//! we derive:
//! - the **pepper** mixed into every verifier hash;
//! - a **per-record sealing key** for each sealed secret.
//!
//! HKDF (RFC 5869) uses the vault key as input keying material (IKM)
//! and a context string (`info`) to produce independent sub-keys.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{Result, TokenVaultError};

/// Length of the vault key and of every derived sub-key (256 bits).
pub const KEY_LEN: usize = 32;

/// Environment variable holding a base64-encoded vault key.
pub const KEY_ENV_VAR: &str = "TOKENVAULT_KEY";

/// The per-deployment vault key. Zeroed on drop and never printed.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct VaultKey {
    bytes: [u8; KEY_LEN],
}

impl VaultKey {
    /// Create a new `VaultKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Build a key from a byte slice of exactly `KEY_LEN` bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; KEY_LEN] = bytes.try_into().map_err(|_| {
            TokenVaultError::KeyfileError(format!(
                "vault key must be exactly {KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self::new(arr))
    }

    /// Decode a base64 vault key, as found in `TOKENVAULT_KEY`.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let decoded = Zeroizing::new(BASE64.decode(encoded.trim()).map_err(|e| {
            TokenVaultError::KeyfileError(format!("vault key is not valid base64: {e}"))
        })?);
        Self::from_slice(&decoded)
    }

    /// Read the key from `TOKENVAULT_KEY`, if set and non-empty.
    pub fn from_env() -> Result<Option<Self>> {
        match std::env::var(KEY_ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => {
                let value = Zeroizing::new(value);
                Self::from_base64(&value).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Derive the pepper mixed into every verifier hash.
    pub fn derive_pepper(&self) -> Result<Zeroizing<[u8; KEY_LEN]>> {
        hkdf_derive(&self.bytes, b"tokenvault-pepper")
    }

    /// Derive the AES-256-GCM key for one sealed record.
    ///
    /// Key fields never contain control characters, so NUL-joining them
    /// is unambiguous.
    pub fn derive_sealing_key(
        &self,
        tenant_id: &str,
        secret_class: &str,
        identifier: &str,
    ) -> Result<Zeroizing<[u8; KEY_LEN]>> {
        let info = format!("tokenvault-seal:{tenant_id}\0{secret_class}\0{identifier}");
        hkdf_derive(&self.bytes, info.as_bytes())
    }
}

impl fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VaultKey(<redacted>)")
    }
}

/// Run HKDF-SHA256 expand with the given `info`.
///
/// The extract step is skipped because the vault key is already uniformly
/// random.
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = Zeroizing::new([0u8; KEY_LEN]);
    hk.expand(info, &mut okm[..])
        .map_err(|e| TokenVaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}
