//! AES-256-GCM authenticated encryption for sealed secrets.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext. `decrypt` splits the nonce back out.
//!
//! Layout of the returned byte buffer:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use zeroize::Zeroizing;

use crate::errors::{Result, TokenVaultError};

/// Size of the AES-256-GCM nonce in bytes.
const NONCE_LEN: usize = 12;

/// Encrypt `plaintext` with a 32-byte `key`.
///
/// Returns nonce || ciphertext.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| TokenVaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| TokenVaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt data produced by `encrypt`.
///
/// The plaintext is returned in a zeroizing buffer.
pub fn decrypt(key: &[u8], ciphertext_with_nonce: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if ciphertext_with_nonce.len() < NONCE_LEN {
        return Err(TokenVaultError::DecryptionFailed);
    }

    let (nonce_bytes, ciphertext) = ciphertext_with_nonce.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| TokenVaultError::DecryptionFailed)?;

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| TokenVaultError::DecryptionFailed)?;

    Ok(Zeroizing::new(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let key = [0xABu8; 32];
        let sealed = encrypt(&key, b"smtp-password").unwrap();
        assert_eq!(decrypt(&key, &sealed).unwrap().as_slice(), b"smtp-password");
    }

    #[test]
    fn fresh_nonce_each_call() {
        let key = [0xCDu8; 32];
        assert_ne!(encrypt(&key, b"x").unwrap(), encrypt(&key, b"x").unwrap());
    }

    #[test]
    fn wrong_key_and_truncation_fail() {
        let sealed = encrypt(&[0x11u8; 32], b"value").unwrap();
        assert!(decrypt(&[0x22u8; 32], &sealed).is_err());
        assert!(decrypt(&[0x11u8; 32], &sealed[..5]).is_err());
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let key = [0xBBu8; 32];
        let mut sealed = encrypt(&key, b"value").unwrap();
        if let Some(byte) = sealed.get_mut(NONCE_LEN + 1) {
            *byte ^= 0xFF;
        }
        assert!(matches!(
            decrypt(&key, &sealed),
            Err(TokenVaultError::DecryptionFailed)
        ));
    }
}
