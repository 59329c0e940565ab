//! `tokenvault fingerprint`: identify the vault key without revealing it.

use crate::cli::output;
use crate::cli::{load_vault_key, Cli};
use crate::crypto::keyfile;
use crate::errors::Result;

/// Execute the `fingerprint` command.
///
/// With `--expect`, fails unless the loaded key matches, so deploy scripts
/// can catch a host running with the wrong key.
pub fn execute(cli: &Cli, expect: Option<&str>) -> Result<()> {
    let key = load_vault_key(cli)?;

    if let Some(expected) = expect {
        keyfile::verify_fingerprint(&key, expected)?;
        output::success("Vault key matches the expected fingerprint");
        return Ok(());
    }

    println!("{}", keyfile::fingerprint(&key));
    Ok(())
}
