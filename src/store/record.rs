//! Record types persisted by the storage adapter.
//!
//! A record is addressed by its [`SecretKey`], the
//! `(tenant_id, secret_class, identifier)` triple. At most one record
//! exists per key; the opaque [`RecordId`] is assigned on first insert and
//! survives later upserts.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{Result, TokenVaultError};

const MAX_TENANT_LEN: usize = 128;
const MAX_CLASS_LEN: usize = 64;
const MAX_IDENTIFIER_LEN: usize = 320;

/// Opaque identifier of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| TokenVaultError::MalformedRecord(format!("bad record id '{s}': {e}")))
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The `(tenant_id, secret_class, identifier)` triple addressing a record.
///
/// Construction validates every field, so any `SecretKey` in hand is safe
/// to hand to a backend. Deserialization goes through the same checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSecretKey")]
pub struct SecretKey {
    tenant_id: String,
    secret_class: String,
    identifier: String,
}

#[derive(Deserialize)]
struct RawSecretKey {
    tenant_id: String,
    secret_class: String,
    identifier: String,
}

impl TryFrom<RawSecretKey> for SecretKey {
    type Error = TokenVaultError;

    fn try_from(raw: RawSecretKey) -> Result<Self> {
        Self::new(&raw.tenant_id, &raw.secret_class, &raw.identifier)
    }
}

impl SecretKey {
    pub fn new(tenant_id: &str, secret_class: &str, identifier: &str) -> Result<Self> {
        validate_text_field("tenant_id", tenant_id, MAX_TENANT_LEN)?;
        validate_secret_class(secret_class)?;
        validate_text_field("identifier", identifier, MAX_IDENTIFIER_LEN)?;
        Ok(Self {
            tenant_id: tenant_id.to_string(),
            secret_class: secret_class.to_string(),
            identifier: identifier.to_string(),
        })
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn secret_class(&self) -> &str {
        &self.secret_class
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.tenant_id, self.secret_class, self.identifier
        )
    }
}

/// A full persisted record, including its encoded value.
#[derive(Debug, Clone)]
pub struct SecretRecord {
    pub id: RecordId,
    pub key: SecretKey,
    pub encoded_value: String,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SecretRecord {
    /// Metadata view without the encoded value.
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            id: self.id,
            key: self.key.clone(),
            last_used_at: self.last_used_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Lightweight metadata about a record (no encoded value).
///
/// Returned by `list` so callers can display what is configured for a
/// tenant without touching salts, hashes or ciphertext.
#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    pub id: RecordId,
    pub key: SecretKey,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validate a tenant id on its own, for tenant-wide queries.
pub fn validate_tenant_id(tenant_id: &str) -> Result<()> {
    validate_text_field("tenant_id", tenant_id, MAX_TENANT_LEN)
}

/// Tenant ids and identifiers: non-empty, bounded, no control characters.
fn validate_text_field(field: &str, value: &str, max_len: usize) -> Result<()> {
    if value.is_empty() {
        return Err(TokenVaultError::Validation(format!("{field} cannot be empty")));
    }
    if value.len() > max_len {
        return Err(TokenVaultError::Validation(format!(
            "{field} cannot exceed {max_len} bytes"
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(TokenVaultError::Validation(format!(
            "{field} cannot contain control characters"
        )));
    }
    Ok(())
}

/// Secret classes are short tags: ASCII letters, digits, `_`, `-`, `.`.
fn validate_secret_class(class: &str) -> Result<()> {
    if class.is_empty() {
        return Err(TokenVaultError::Validation(
            "secret_class cannot be empty".into(),
        ));
    }
    if class.len() > MAX_CLASS_LEN {
        return Err(TokenVaultError::Validation(format!(
            "secret_class cannot exceed {MAX_CLASS_LEN} bytes"
        )));
    }
    if !class
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
    {
        return Err(TokenVaultError::Validation(format!(
            "secret_class '{class}' contains invalid characters: only ASCII letters, digits, underscores, hyphens, and periods are allowed"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_keys() {
        assert!(SecretKey::new("t1", "email", "a@b.com").is_ok());
        assert!(SecretKey::new("site-42", "api_key", "mailchimp").is_ok());
        assert!(SecretKey::new("t1", "smtp.v2", "Ünïcødé ok").is_ok());
    }

    #[test]
    fn rejects_empty_fields() {
        assert!(matches!(
            SecretKey::new("", "email", "a@b.com"),
            Err(TokenVaultError::Validation(_))
        ));
        assert!(matches!(
            SecretKey::new("t1", "", "a@b.com"),
            Err(TokenVaultError::Validation(_))
        ));
        assert!(matches!(
            SecretKey::new("t1", "email", ""),
            Err(TokenVaultError::Validation(_))
        ));
    }

    #[test]
    fn rejects_bad_class_characters() {
        assert!(SecretKey::new("t1", "api key", "x").is_err());
        assert!(SecretKey::new("t1", "email/smtp", "x").is_err());
    }

    #[test]
    fn rejects_control_characters() {
        assert!(SecretKey::new("t\01", "email", "x").is_err());
        assert!(SecretKey::new("t1", "email", "a@b.com\n").is_err());
    }

    #[test]
    fn rejects_overlong_fields() {
        assert!(SecretKey::new(&"t".repeat(129), "email", "x").is_err());
        assert!(SecretKey::new("t1", &"c".repeat(65), "x").is_err());
        assert!(SecretKey::new("t1", "email", &"i".repeat(321)).is_err());
        assert!(SecretKey::new("t1", "email", &"i".repeat(320)).is_ok());
    }

    #[test]
    fn deserialize_validates_fields() {
        let key: SecretKey = serde_json::from_str(
            r#"{"tenant_id":"t1","secret_class":"email","identifier":"a@b.com"}"#,
        )
        .unwrap();
        assert_eq!(key, SecretKey::new("t1", "email", "a@b.com").unwrap());

        let empty = serde_json::from_str::<SecretKey>(
            r#"{"tenant_id":"t1","secret_class":"email","identifier":""}"#,
        );
        assert!(empty.is_err());

        let bad_class = serde_json::from_str::<SecretKey>(
            r#"{"tenant_id":"t1","secret_class":"api key","identifier":"x"}"#,
        );
        assert!(bad_class.is_err());
    }

    #[test]
    fn record_id_parse_roundtrip() {
        let id = RecordId::new();
        assert_eq!(RecordId::parse(&id.to_string()).unwrap(), id);
        assert!(RecordId::parse("not-a-uuid").is_err());
    }
}
