//! One-way hashing of stored secrets.
//!
//! Every stored secret is reduced to `H(plaintext || pepper || salt)`.
//! The hash step sits behind the [`SecretHasher`] trait so the vault's
//! `store`/`verify` contracts do not depend on which function is used:
//!
//! - [`Sha256Hasher`]: a single SHA-256 pass with no iteration count.
//!   Fast, and therefore weak against offline guessing of user-chosen
//!   passwords. This is the default for compatibility with existing rows.
//! - [`Argon2Hasher`]: Argon2id over `plaintext || pepper` with the record
//!   salt. Memory-hard; select it with `hasher = "argon2id"` in settings.
//!
//! Switching hashers invalidates existing verifiers, since the stored
//! value does not record which function produced it.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::errors::{Result, TokenVaultError};

/// Length of the per-record salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of the produced hash in bytes.
pub const HASH_LEN: usize = 32;

/// Minimum safe Argon2 memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// A one-way function from `(plaintext, pepper, salt)` to a fixed-size hash.
pub trait SecretHasher: Send + Sync {
    /// Short name used in logs and settings.
    fn name(&self) -> &'static str;

    /// Hash `plaintext` with the deployment `pepper` and the record `salt`.
    fn hash(&self, plaintext: &[u8], pepper: &[u8], salt: &[u8]) -> Result<[u8; HASH_LEN]>;
}

/// Single-pass SHA-256 over `plaintext || pepper || salt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl SecretHasher for Sha256Hasher {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn hash(&self, plaintext: &[u8], pepper: &[u8], salt: &[u8]) -> Result<[u8; HASH_LEN]> {
        let mut hasher = Sha256::new();
        hasher.update(plaintext);
        hasher.update(pepper);
        hasher.update(salt);
        Ok(hasher.finalize().into())
    }
}

/// Configurable Argon2id parameters.
///
/// These map 1:1 to the fields in `Settings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// Argon2id with the record salt, over `plaintext || pepper`.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Argon2Params,
}

impl Argon2Hasher {
    /// Build a hasher, rejecting dangerously weak parameters up front so a
    /// misconfiguration fails at startup rather than on the first `store`.
    pub fn new(params: Argon2Params) -> Result<Self> {
        if params.memory_kib < MIN_MEMORY_KIB {
            return Err(TokenVaultError::HashingFailed(format!(
                "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
                params.memory_kib
            )));
        }
        if params.iterations < 1 {
            return Err(TokenVaultError::HashingFailed(
                "Argon2 iterations must be at least 1".into(),
            ));
        }
        if params.parallelism < 1 {
            return Err(TokenVaultError::HashingFailed(
                "Argon2 parallelism must be at least 1".into(),
            ));
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> Argon2Params {
        self.params
    }
}

impl SecretHasher for Argon2Hasher {
    fn name(&self) -> &'static str {
        "argon2id"
    }

    fn hash(&self, plaintext: &[u8], pepper: &[u8], salt: &[u8]) -> Result<[u8; HASH_LEN]> {
        let params = Params::new(
            self.params.memory_kib,
            self.params.iterations,
            self.params.parallelism,
            Some(HASH_LEN),
        )
        .map_err(|e| TokenVaultError::HashingFailed(format!("invalid Argon2 params: {e}")))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut input = Zeroizing::new(Vec::with_capacity(plaintext.len() + pepper.len()));
        input.extend_from_slice(plaintext);
        input.extend_from_slice(pepper);

        let mut out = [0u8; HASH_LEN];
        argon2
            .hash_password_into(&input, salt, &mut out)
            .map_err(|e| TokenVaultError::HashingFailed(format!("Argon2id hashing failed: {e}")))?;

        Ok(out)
    }
}

/// Generate a cryptographically random salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
