//! `tokenvault reveal`: print a sealed secret to stdout.
//!
//! Prints the value alone on one line so it can be piped:
//!   tokenvault reveal t1 smtp mail.example.com | some-mailer --password-stdin

use std::io::{self, Write};

use crate::cli::{log_audit, open_sealed, Cli, KeyArgs};
use crate::errors::{Result, TokenVaultError};

/// Execute the `reveal` command.
pub fn execute(cli: &Cli, key: &KeyArgs) -> Result<()> {
    let sealed = open_sealed(cli)?;
    let revealed = sealed.reveal(&key.tenant_id, &key.secret_class, &key.identifier)?;

    let Some(secret) = revealed else {
        log_audit(cli, "reveal", key.to_key().ok().as_ref(), Some("absent"));
        return Err(TokenVaultError::CommandFailed(format!(
            "no sealed secret for {}/{}/{}",
            key.tenant_id, key.secret_class, key.identifier
        )));
    };

    log_audit(cli, "reveal", key.to_key().ok().as_ref(), Some("ok"));

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", secret.as_str())?;
    stdout.flush()?;
    Ok(())
}
