//! `tokenvault verify`: check a candidate against the stored verifier.
//!
//! Exits non-zero on a mismatch so the command can gate shell scripts.

use crate::cli::output;
use crate::cli::{log_audit, open_vault, read_secret, Cli, KeyArgs};
use crate::errors::{Result, TokenVaultError};

/// Execute the `verify` command.
pub fn execute(cli: &Cli, key: &KeyArgs, value: Option<&str>) -> Result<()> {
    let candidate = read_secret(value, &format!("Enter secret for {}", key.identifier))?;

    let vault = open_vault(cli)?;
    let valid = vault.verify(
        &key.tenant_id,
        &key.secret_class,
        &key.identifier,
        &candidate,
    )?;

    let outcome = if valid { "match" } else { "mismatch" };
    log_audit(cli, "verify", key.to_key().ok().as_ref(), Some(outcome));

    if !valid {
        return Err(TokenVaultError::CommandFailed("secret does not match".into()));
    }

    output::success("Secret matches");
    Ok(())
}
