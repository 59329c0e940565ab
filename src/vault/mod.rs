//! Vault module: tenant-scoped secret storage.
//!
//! This module provides:
//! - `CredentialVault`, salted one-way verifiers (`verifier`)
//! - `SealedStore`, encrypted secrets that can be read back (`sealed`)
//! - Stored-value encodings (`format`)
//! - The JSON request `Dispatcher` over both (`dispatch`)

pub mod dispatch;
pub mod format;
pub mod sealed;
pub mod verifier;

pub use dispatch::{Dispatcher, Exchange, VaultRequest, VaultResponse};
pub use sealed::SealedStore;
pub use verifier::CredentialVault;

use crate::errors::{Result, TokenVaultError};

/// Upper bound on a stored plaintext, in bytes.
pub const MAX_SECRET_LEN: usize = 4096;

/// Plaintexts must be non-empty and bounded.
fn validate_plaintext(plaintext: &str) -> Result<()> {
    if plaintext.is_empty() {
        return Err(TokenVaultError::Validation("secret cannot be empty".into()));
    }
    if plaintext.len() > MAX_SECRET_LEN {
        return Err(TokenVaultError::Validation(format!(
            "secret cannot exceed {MAX_SECRET_LEN} bytes"
        )));
    }
    Ok(())
}
