//! Encoding of stored values.
//!
//! A verifier is stored as
//!
//! ```text
//! base64(salt) ":" base64(hash)
//! ```
//!
//! The standard base64 alphabet never contains `:`, so the separator is
//! unambiguous. A sealed secret is stored as `base64(nonce || ciphertext)`.
//! Neither layout is a public wire format.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::crypto::hasher::HASH_LEN;
use crate::errors::{Result, TokenVaultError};

/// Separator between the salt and hash components.
pub const SEPARATOR: char = ':';

/// A parsed verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verifier {
    pub salt: Vec<u8>,
    pub hash: Vec<u8>,
}

/// Encode a salt and hash into the stored representation.
pub fn encode_verifier(salt: &[u8], hash: &[u8]) -> String {
    format!("{}{SEPARATOR}{}", BASE64.encode(salt), BASE64.encode(hash))
}

/// Parse a stored verifier.
pub fn decode_verifier(encoded: &str) -> Result<Verifier> {
    let (salt_b64, hash_b64) = encoded
        .split_once(SEPARATOR)
        .ok_or_else(|| TokenVaultError::MalformedRecord("verifier has no separator".into()))?;

    let salt = BASE64
        .decode(salt_b64)
        .map_err(|e| TokenVaultError::MalformedRecord(format!("verifier salt: {e}")))?;
    let hash = BASE64
        .decode(hash_b64)
        .map_err(|e| TokenVaultError::MalformedRecord(format!("verifier hash: {e}")))?;

    if salt.is_empty() {
        return Err(TokenVaultError::MalformedRecord(
            "verifier salt is empty".into(),
        ));
    }
    if hash.len() != HASH_LEN {
        return Err(TokenVaultError::MalformedRecord(format!(
            "verifier hash must be {HASH_LEN} bytes, got {}",
            hash.len()
        )));
    }

    Ok(Verifier { salt, hash })
}

/// Encode a sealed blob (nonce || ciphertext).
pub fn encode_sealed(blob: &[u8]) -> String {
    BASE64.encode(blob)
}

/// Parse a stored sealed blob.
pub fn decode_sealed(encoded: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(encoded)
        .map_err(|e| TokenVaultError::MalformedRecord(format!("sealed value: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_verifier_has_exactly_one_separator() {
        let encoded = encode_verifier(&[0xFF; 16], &[0xFE; HASH_LEN]);
        assert_eq!(encoded.matches(SEPARATOR).count(), 1);

        let parsed = decode_verifier(&encoded).unwrap();
        assert_eq!(parsed.salt, vec![0xFF; 16]);
        assert_eq!(parsed.hash, vec![0xFE; HASH_LEN]);
    }

    #[test]
    fn rejects_malformed_verifiers() {
        let hash = BASE64.encode([0u8; HASH_LEN]);
        for bad in [
            String::new(),
            "no-separator".to_string(),
            format!(":{hash}"),
            format!("!!!:{hash}"),
            format!("{}:{}", BASE64.encode([1u8; 16]), BASE64.encode([0u8; 8])),
        ] {
            assert!(
                matches!(decode_verifier(&bad), Err(TokenVaultError::MalformedRecord(_))),
                "should reject {bad:?}"
            );
        }
    }

    #[test]
    fn sealed_decode_rejects_garbage() {
        assert!(decode_sealed("%%%").is_err());
        assert_eq!(decode_sealed(&encode_sealed(b"abc")).unwrap(), b"abc");
    }
}
