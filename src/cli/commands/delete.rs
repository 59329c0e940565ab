//! `tokenvault delete`: remove a stored secret.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{log_audit, open_sealed, open_vault, Cli, KeyArgs};
use crate::errors::{Result, TokenVaultError};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, key: &KeyArgs, sealed: bool, force: bool) -> Result<()> {
    let label = format!("{}/{}/{}", key.tenant_id, key.secret_class, key.identifier);

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete secret '{label}'?"))
            .default(false)
            .interact()
            .map_err(|e| TokenVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    if sealed {
        open_sealed(cli)?.delete(&key.tenant_id, &key.secret_class, &key.identifier)?;
        log_audit(cli, "delete", key.to_key().ok().as_ref(), Some("sealed"));
    } else {
        open_vault(cli)?.delete(&key.tenant_id, &key.secret_class, &key.identifier)?;
        log_audit(cli, "delete", key.to_key().ok().as_ref(), Some("verifier"));
    }

    output::success(&format!("Deleted secret '{label}'"));
    Ok(())
}
