//! Cryptographic primitives for TokenVault.
//!
//! This module provides:
//! - Salted one-way hashing behind the `SecretHasher` trait (`hasher`)
//! - The per-deployment vault key and HKDF sub-keys (`keys`)
//! - Vault key files (`keyfile`)
//! - AES-256-GCM for sealed secrets (`encryption`)

pub mod encryption;
pub mod hasher;
pub mod keyfile;
pub mod keys;

pub use encryption::{decrypt, encrypt};
pub use hasher::{generate_salt, Argon2Hasher, Argon2Params, SecretHasher, Sha256Hasher};
pub use keyfile::{fingerprint, generate_keyfile, load_keyfile, verify_fingerprint};
pub use keys::VaultKey;

use subtle::ConstantTimeEq;

/// Compare two byte strings in constant time.
///
/// Running time depends only on the lengths, never on where the first
/// differing byte sits.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::constant_time_eq;

    #[test]
    fn constant_time_eq_semantics() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"", b""));
    }
}
