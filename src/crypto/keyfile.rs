//! Vault key files.
//!
//! A key file holds the raw 32-byte per-deployment vault key. It is
//! generated once (`tokenvault keygen`), kept out of the database
//! directory's backups, and loaded at process start.
//!
//! A fingerprint (SHA-256, base64) lets operators confirm two hosts run
//! with the same key without ever printing the key itself.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::keys::{VaultKey, KEY_LEN};
use crate::errors::{Result, TokenVaultError};

/// Generate a new random vault key and write it to `path`.
///
/// The file is written with restrictive permissions (owner-only read).
/// Refuses to overwrite an existing key file: losing the old key makes
/// every stored verifier and sealed secret unusable.
pub fn generate_keyfile(path: &Path) -> Result<VaultKey> {
    if path.exists() {
        return Err(TokenVaultError::KeyfileError(format!(
            "key file already exists at {}",
            path.display()
        )));
    }

    let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
    rand::rng().fill_bytes(&mut bytes[..]);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                TokenVaultError::KeyfileError(format!("cannot create key file directory: {e}"))
            })?;
        }
    }

    fs::write(path, &bytes[..])
        .map_err(|e| TokenVaultError::KeyfileError(format!("failed to write key file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        fs::set_permissions(path, perms).map_err(|e| {
            TokenVaultError::KeyfileError(format!("failed to set key file permissions: {e}"))
        })?;
    }

    Ok(VaultKey::new(*bytes))
}

/// Load a vault key from disk and validate its length.
pub fn load_keyfile(path: &Path) -> Result<VaultKey> {
    if !path.exists() {
        return Err(TokenVaultError::KeyfileError(format!(
            "key file not found at {} (run `tokenvault keygen` or set TOKENVAULT_KEY)",
            path.display()
        )));
    }

    let data = Zeroizing::new(
        fs::read(path)
            .map_err(|e| TokenVaultError::KeyfileError(format!("failed to read key file: {e}")))?,
    );

    VaultKey::from_slice(&data)
}

/// SHA-256 fingerprint of a vault key, base64-encoded.
pub fn fingerprint(key: &VaultKey) -> String {
    BASE64.encode(Sha256::digest(key.as_bytes()))
}

/// Check a key against an expected fingerprint in constant time.
pub fn verify_fingerprint(key: &VaultKey, expected: &str) -> Result<()> {
    let actual = fingerprint(key);

    if actual.as_bytes().ct_eq(expected.trim().as_bytes()).into() {
        Ok(())
    } else {
        Err(TokenVaultError::KeyfileError(
            "wrong vault key: fingerprint does not match".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn generate_and_load_keyfile_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.key");

        let generated = generate_keyfile(&path).unwrap();
        let loaded = load_keyfile(&path).unwrap();
        assert_eq!(generated.as_bytes(), loaded.as_bytes());
    }

    #[test]
    fn generate_keyfile_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("keys").join("vault.key");

        generate_keyfile(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn generate_keyfile_fails_if_exists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.key");

        generate_keyfile(&path).unwrap();
        assert!(generate_keyfile(&path).is_err());
    }

    #[test]
    fn load_keyfile_fails_if_missing() {
        let dir = TempDir::new().unwrap();
        assert!(load_keyfile(&dir.path().join("missing.key")).is_err());
    }

    #[test]
    fn load_keyfile_fails_on_wrong_length() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.key");
        fs::write(&path, [0u8; 16]).unwrap();

        assert!(load_keyfile(&path).is_err());
    }

    #[test]
    fn fingerprint_verification() {
        let key = VaultKey::new([0x42; KEY_LEN]);
        let other = VaultKey::new([0x43; KEY_LEN]);
        let fp = fingerprint(&key);

        assert!(verify_fingerprint(&key, &fp).is_ok());
        assert!(verify_fingerprint(&other, &fp).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn keyfile_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.key");
        generate_keyfile(&path).unwrap();

        let perms = fs::metadata(&path).unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }
}
