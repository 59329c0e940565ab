//! `tokenvault store`: add or replace a secret's verifier.

use crate::cli::output;
use crate::cli::{log_audit, open_vault, read_secret, Cli, KeyArgs};
use crate::errors::Result;

/// Execute the `store` command.
pub fn execute(cli: &Cli, key: &KeyArgs, value: Option<&str>) -> Result<()> {
    let secret = read_secret(value, &format!("Enter secret for {}", key.identifier))?;

    let vault = open_vault(cli)?;
    let existed = vault.check(&key.tenant_id, &key.secret_class, &key.identifier)?;
    let id = vault.store(&key.tenant_id, &key.secret_class, &key.identifier, &secret)?;

    let op_detail = if existed { "replaced" } else { "added" };
    log_audit(cli, "store", key.to_key().ok().as_ref(), Some(op_detail));

    output::success(&format!(
        "Secret for {}/{}/{} {op_detail} (record {id})",
        key.tenant_id, key.secret_class, key.identifier
    ));

    Ok(())
}
