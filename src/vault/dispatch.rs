//! Single JSON entry point over both vaults.
//!
//! Integration flows send one request object with an `action` tag:
//!
//! ```json
//! {"action": "verify", "tenant_id": "t1", "secret_class": "email",
//!  "identifier": "a@b.com", "secret": "Passw0rd!"}
//! ```
//!
//! and get back either an action-specific result or
//! `{"error": {"kind": ..., "message": ..., "retryable": ...}}`.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::errors::{Result, TokenVaultError};
use crate::store::{RecordId, RecordStore, SecretKey};

use super::{CredentialVault, SealedStore};

/// Key fields shared by every request.
#[derive(Debug, Deserialize)]
pub struct KeyPayload {
    pub tenant_id: String,
    pub secret_class: String,
    pub identifier: String,
}

/// Key fields plus a plaintext secret.
#[derive(Deserialize)]
pub struct SecretPayload {
    pub tenant_id: String,
    pub secret_class: String,
    pub identifier: String,
    pub secret: Zeroizing<String>,
}

#[derive(Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum VaultRequest {
    Store(SecretPayload),
    Verify(SecretPayload),
    Check(KeyPayload),
    Delete(KeyPayload),
    Seal(SecretPayload),
    Reveal(KeyPayload),
    DeleteSealed(KeyPayload),
}

impl VaultRequest {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Store(_) => "store",
            Self::Verify(_) => "verify",
            Self::Check(_) => "check",
            Self::Delete(_) => "delete",
            Self::Seal(_) => "seal",
            Self::Reveal(_) => "reveal",
            Self::DeleteSealed(_) => "delete_sealed",
        }
    }

    /// The validated key the request addresses.
    pub fn key(&self) -> Result<SecretKey> {
        match self {
            Self::Store(p) | Self::Verify(p) | Self::Seal(p) => {
                SecretKey::new(&p.tenant_id, &p.secret_class, &p.identifier)
            }
            Self::Check(p) | Self::Delete(p) | Self::Reveal(p) | Self::DeleteSealed(p) => {
                SecretKey::new(&p.tenant_id, &p.secret_class, &p.identifier)
            }
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl From<&TokenVaultError> for ErrorBody {
    fn from(e: &TokenVaultError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
            retryable: e.is_retryable(),
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum VaultResponse {
    Stored { record_id: RecordId },
    Verified { valid: bool },
    Exists { exists: bool },
    Deleted { deleted: bool },
    Revealed { secret: Option<Zeroizing<String>> },
    Error { error: ErrorBody },
}

impl VaultResponse {
    /// Short outcome label for audit records: `ok`, `match`/`mismatch`,
    /// `present`/`absent`, or the error kind.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Stored { .. } | Self::Deleted { .. } => "ok",
            Self::Verified { valid: true } => "match",
            Self::Verified { valid: false } => "mismatch",
            Self::Exists { exists: true } => "present",
            Self::Exists { exists: false } | Self::Revealed { secret: None } => "absent",
            Self::Revealed { secret: Some(_) } => "ok",
            Self::Error { error } => error.kind,
        }
    }
}

/// What one JSON exchange did, for callers that keep an audit trail.
///
/// `action` and `key` are `None` when the request could not be parsed or
/// its key did not validate.
#[derive(Debug)]
pub struct Exchange {
    pub action: Option<&'static str>,
    pub key: Option<SecretKey>,
    pub outcome: &'static str,
    pub response: String,
}

/// Routes requests to the verification vault or the sealed store.
pub struct Dispatcher<V, S> {
    vault: CredentialVault<V>,
    sealed: SealedStore<S>,
}

impl<V: RecordStore, S: RecordStore> Dispatcher<V, S> {
    pub fn new(vault: CredentialVault<V>, sealed: SealedStore<S>) -> Self {
        Self { vault, sealed }
    }

    pub fn vault(&self) -> &CredentialVault<V> {
        &self.vault
    }

    pub fn sealed(&self) -> &SealedStore<S> {
        &self.sealed
    }

    /// Handle one request. Errors are folded into `VaultResponse::Error`.
    pub fn handle(&self, request: &VaultRequest) -> VaultResponse {
        let action = request.action();
        match self.try_handle(request) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(action, kind = e.kind(), retryable = e.is_retryable(), "request failed");
                VaultResponse::Error {
                    error: ErrorBody::from(&e),
                }
            }
        }
    }

    /// Parse a JSON request, handle it, and serialize the response.
    ///
    /// Unparseable input becomes a `validation` error response. The only
    /// `Err` is a failure to serialize the response itself.
    pub fn handle_json(&self, input: &str) -> Result<String> {
        self.exchange_json(input).map(|exchange| exchange.response)
    }

    /// Like [`handle_json`](Self::handle_json), but also reports the
    /// action, key and outcome of the request.
    pub fn exchange_json(&self, input: &str) -> Result<Exchange> {
        let (action, key, response) = match serde_json::from_str::<VaultRequest>(input) {
            Ok(request) => (
                Some(request.action()),
                request.key().ok(),
                self.handle(&request),
            ),
            Err(e) => (
                None,
                None,
                VaultResponse::Error {
                    error: ErrorBody::from(&TokenVaultError::Validation(format!(
                        "malformed request: {}",
                        describe_parse_error(&e)
                    ))),
                },
            ),
        };

        let outcome = response.outcome();
        let response = serde_json::to_string(&response)
            .map_err(|e| TokenVaultError::SerializationError(format!("response: {e}")))?;

        Ok(Exchange {
            action,
            key,
            outcome,
            response,
        })
    }

    fn try_handle(&self, request: &VaultRequest) -> Result<VaultResponse> {
        tracing::debug!(action = request.action(), "dispatch");
        Ok(match request {
            VaultRequest::Store(p) => VaultResponse::Stored {
                record_id: self
                    .vault
                    .store(&p.tenant_id, &p.secret_class, &p.identifier, &p.secret)?,
            },
            VaultRequest::Verify(p) => VaultResponse::Verified {
                valid: self
                    .vault
                    .verify(&p.tenant_id, &p.secret_class, &p.identifier, &p.secret)?,
            },
            VaultRequest::Check(p) => VaultResponse::Exists {
                exists: self.vault.check(&p.tenant_id, &p.secret_class, &p.identifier)?,
            },
            VaultRequest::Delete(p) => {
                self.vault.delete(&p.tenant_id, &p.secret_class, &p.identifier)?;
                VaultResponse::Deleted { deleted: true }
            }
            VaultRequest::Seal(p) => VaultResponse::Stored {
                record_id: self
                    .sealed
                    .seal(&p.tenant_id, &p.secret_class, &p.identifier, &p.secret)?,
            },
            VaultRequest::Reveal(p) => VaultResponse::Revealed {
                secret: self
                    .sealed
                    .reveal(&p.tenant_id, &p.secret_class, &p.identifier)?,
            },
            VaultRequest::DeleteSealed(p) => {
                self.sealed
                    .delete(&p.tenant_id, &p.secret_class, &p.identifier)?;
                VaultResponse::Deleted { deleted: true }
            }
        })
    }
}

/// Describe a parse failure without echoing input, which may hold a secret.
fn describe_parse_error(e: &serde_json::Error) -> String {
    use serde_json::error::Category;
    match e.classify() {
        Category::Syntax | Category::Eof => {
            format!("invalid JSON at line {} column {}", e.line(), e.column())
        }
        Category::Data => "unknown action or missing/invalid field".to_string(),
        Category::Io => "could not read request".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::VaultKey;
    use crate::store::MemoryStore;
    use serde_json::Value;
    use std::sync::Arc;

    fn dispatcher() -> Dispatcher<MemoryStore, MemoryStore> {
        let key = Arc::new(VaultKey::new([4u8; 32]));
        let vault = CredentialVault::with_default_hasher(MemoryStore::new(), &key).unwrap();
        let sealed = SealedStore::new(MemoryStore::new(), key);
        Dispatcher::new(vault, sealed)
    }

    fn call(d: &Dispatcher<MemoryStore, MemoryStore>, req: Value) -> Value {
        serde_json::from_str(&d.handle_json(&req.to_string()).unwrap()).unwrap()
    }

    #[test]
    fn store_verify_check_delete_flow() {
        let d = dispatcher();
        let key = serde_json::json!({"tenant_id": "t1", "secret_class": "email", "identifier": "a@b.com"});

        let mut store = key.clone();
        store["action"] = "store".into();
        store["secret"] = "Passw0rd!".into();
        let stored = call(&d, store);
        assert!(stored["record_id"].is_string());

        let mut verify = key.clone();
        verify["action"] = "verify".into();
        verify["secret"] = "Passw0rd!".into();
        assert_eq!(call(&d, verify.clone())["valid"], true);
        verify["secret"] = "wrong".into();
        assert_eq!(call(&d, verify)["valid"], false);

        let mut delete = key.clone();
        delete["action"] = "delete".into();
        assert_eq!(call(&d, delete.clone())["deleted"], true);
        assert_eq!(call(&d, delete)["deleted"], true);

        let mut check = key;
        check["action"] = "check".into();
        assert_eq!(call(&d, check)["exists"], false);
    }

    #[test]
    fn seal_and_reveal() {
        let d = dispatcher();
        let res = call(
            &d,
            serde_json::json!({"action": "seal", "tenant_id": "t1", "secret_class": "smtp",
                "identifier": "a@b.com", "secret": "mail-pass"}),
        );
        assert!(res["record_id"].is_string());

        let res = call(
            &d,
            serde_json::json!({"action": "reveal", "tenant_id": "t1", "secret_class": "smtp",
                "identifier": "a@b.com"}),
        );
        assert_eq!(res["secret"], "mail-pass");

        call(
            &d,
            serde_json::json!({"action": "delete_sealed", "tenant_id": "t1", "secret_class": "smtp",
                "identifier": "a@b.com"}),
        );
        let res = call(
            &d,
            serde_json::json!({"action": "reveal", "tenant_id": "t1", "secret_class": "smtp",
                "identifier": "a@b.com"}),
        );
        assert!(res["secret"].is_null());
    }

    #[test]
    fn validation_errors_are_reported() {
        let d = dispatcher();
        let res = call(
            &d,
            serde_json::json!({"action": "store", "tenant_id": "t1", "secret_class": "email",
                "identifier": "", "secret": "x"}),
        );
        assert_eq!(res["error"]["kind"], "validation");
        assert_eq!(res["error"]["retryable"], false);
    }

    #[test]
    fn malformed_requests_do_not_echo_secrets() {
        let d = dispatcher();
        let out = d
            .handle_json(r#"{"action": "explode", "secret": "hunter2"}"#)
            .unwrap();
        assert!(out.contains("\"validation\""));
        assert!(!out.contains("hunter2"));

        let out = d.handle_json("{not json").unwrap();
        assert!(out.contains("\"validation\""));
    }

    #[test]
    fn exchange_reports_action_key_and_outcome() {
        let d = dispatcher();

        let stored = d
            .exchange_json(
                r#"{"action":"store","tenant_id":"t9","secret_class":"email",
                    "identifier":"a@b.com","secret":"pw"}"#,
            )
            .unwrap();
        assert_eq!(stored.action, Some("store"));
        assert_eq!(stored.key, Some(SecretKey::new("t9", "email", "a@b.com").unwrap()));
        assert_eq!(stored.outcome, "ok");

        let mismatch = d
            .exchange_json(
                r#"{"action":"verify","tenant_id":"t9","secret_class":"email",
                    "identifier":"a@b.com","secret":"nope"}"#,
            )
            .unwrap();
        assert_eq!(mismatch.outcome, "mismatch");

        let sealed_gone = d
            .exchange_json(
                r#"{"action":"reveal","tenant_id":"t9","secret_class":"email",
                    "identifier":"a@b.com"}"#,
            )
            .unwrap();
        assert_eq!(sealed_gone.action, Some("reveal"));
        assert_eq!(sealed_gone.outcome, "absent");
    }

    #[test]
    fn exchange_of_bad_input_has_no_key() {
        let d = dispatcher();

        let garbage = d.exchange_json("{not json").unwrap();
        assert_eq!(garbage.action, None);
        assert_eq!(garbage.key, None);
        assert_eq!(garbage.outcome, "validation");

        let bad_key = d
            .exchange_json(
                r#"{"action":"delete","tenant_id":"t9","secret_class":"email","identifier":""}"#,
            )
            .unwrap();
        assert_eq!(bad_key.action, Some("delete"));
        assert_eq!(bad_key.key, None);
        assert_eq!(bad_key.outcome, "validation");
    }

    #[test]
    fn verifying_and_sealed_stores_are_separate() {
        let d = dispatcher();
        call(
            &d,
            serde_json::json!({"action": "store", "tenant_id": "t1", "secret_class": "email",
                "identifier": "a@b.com", "secret": "pw"}),
        );
        let res = call(
            &d,
            serde_json::json!({"action": "reveal", "tenant_id": "t1", "secret_class": "email",
                "identifier": "a@b.com"}),
        );
        assert!(res["secret"].is_null());
    }
}
