//! `tokenvault seal`: encrypt a secret that must be read back later.

use crate::cli::output;
use crate::cli::{log_audit, open_sealed, read_secret, Cli, KeyArgs};
use crate::errors::Result;

/// Execute the `seal` command.
pub fn execute(cli: &Cli, key: &KeyArgs, value: Option<&str>) -> Result<()> {
    let secret = read_secret(value, &format!("Enter secret for {}", key.identifier))?;

    let sealed = open_sealed(cli)?;
    let id = sealed.seal(&key.tenant_id, &key.secret_class, &key.identifier, &secret)?;
    log_audit(cli, "seal", key.to_key().ok().as_ref(), None);

    output::success(&format!(
        "Sealed secret for {}/{}/{} (record {id})",
        key.tenant_id, key.secret_class, key.identifier
    ));
    Ok(())
}
