//! `tokenvault check`: report whether a secret is configured.

use crate::cli::output;
use crate::cli::{open_sealed, open_vault, Cli, KeyArgs};
use crate::errors::Result;

/// Execute the `check` command. Looks in both stores.
pub fn execute(cli: &Cli, key: &KeyArgs) -> Result<()> {
    let vault = open_vault(cli)?;
    let sealed = open_sealed(cli)?;

    let has_verifier = vault.check(&key.tenant_id, &key.secret_class, &key.identifier)?;
    let has_sealed = sealed.check(&key.tenant_id, &key.secret_class, &key.identifier)?;

    let label = format!("{}/{}/{}", key.tenant_id, key.secret_class, key.identifier);
    match (has_verifier, has_sealed) {
        (true, true) => output::success(&format!("{label}: verifier and sealed secret stored")),
        (true, false) => output::success(&format!("{label}: verifier stored")),
        (false, true) => output::success(&format!("{label}: sealed secret stored")),
        (false, false) => output::info(&format!("{label}: not stored")),
    }

    Ok(())
}
