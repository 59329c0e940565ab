use thiserror::Error;

/// All errors that can occur in TokenVault.
#[derive(Debug, Error)]
pub enum TokenVaultError {
    // --- Caller input ---
    #[error("Invalid input: {0}")]
    Validation(String),

    // --- Backing store ---
    #[error("Storage error: {message}")]
    Storage { message: String, retryable: bool },

    #[error("Malformed stored value: {0}")]
    MalformedRecord(String),

    // --- Crypto errors ---
    #[error("Hashing failed: {0}")]
    HashingFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: wrong vault key or corrupted data")]
    DecryptionFailed,

    // --- Key file errors ---
    #[error("Key file error: {0}")]
    KeyfileError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- Audit errors ---
    #[error("Audit error: {0}")]
    AuditError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl TokenVaultError {
    /// Build a non-retryable storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            retryable: false,
        }
    }

    /// Build a storage error the caller may retry with backoff
    /// (busy database, lock contention, timeout).
    pub fn transient_storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            retryable: true,
        }
    }

    /// Whether the caller may retry the failed operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage { retryable: true, .. })
    }

    /// Coarse classification used when errors cross the request boundary:
    /// `validation` is a client-input failure, `storage` a backing-store
    /// failure, anything else is `internal`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Storage { .. } | Self::MalformedRecord(_) => "storage",
            _ => "internal",
        }
    }
}

/// Convenience type alias for TokenVault results.
pub type Result<T> = std::result::Result<T, TokenVaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_storage_is_retryable() {
        assert!(TokenVaultError::transient_storage("database is locked").is_retryable());
        assert!(!TokenVaultError::storage("disk I/O error").is_retryable());
        assert!(!TokenVaultError::Validation("identifier is empty".into()).is_retryable());
        assert!(!TokenVaultError::MalformedRecord("missing separator".into()).is_retryable());
    }

    #[test]
    fn kinds_group_errors_for_callers() {
        assert_eq!(TokenVaultError::Validation("x".into()).kind(), "validation");
        assert_eq!(TokenVaultError::storage("x").kind(), "storage");
        assert_eq!(TokenVaultError::MalformedRecord("x".into()).kind(), "storage");
        assert_eq!(TokenVaultError::DecryptionFailed.kind(), "internal");
    }
}
