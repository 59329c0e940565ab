//! `tokenvault keygen`: create the per-deployment vault key.

use crate::cli::output;
use crate::cli::{key_file_path, log_audit, Cli};
use crate::crypto::keyfile;
use crate::errors::Result;

/// Execute the `keygen` command.
pub fn execute(cli: &Cli, path: Option<&str>) -> Result<()> {
    let target = match path {
        Some(p) => std::env::current_dir()?.join(p),
        None => key_file_path(cli)?,
    };

    let key = keyfile::generate_keyfile(&target)?;
    log_audit(cli, "keygen", None, None);

    output::success(&format!("Vault key written to {}", target.display()));
    output::info(&format!("Fingerprint: {}", keyfile::fingerprint(&key)));
    output::tip("Back this file up. Without it, stored secrets cannot be verified or revealed.");

    Ok(())
}
