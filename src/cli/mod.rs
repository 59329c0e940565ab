//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use crate::audit::AuditLog;
use crate::config::Settings;
use crate::crypto::keyfile;
use crate::crypto::keys::VaultKey;
use crate::errors::{Result, TokenVaultError};
use crate::store::{RecordTable, SecretKey, SqliteStore};
use crate::vault::{CredentialVault, SealedStore};

/// TokenVault CLI: tenant-scoped credential vault.
#[derive(Parser)]
#[command(
    name = "tokenvault",
    about = "Tenant-scoped credential vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the vault database (overrides .tokenvault.toml)
    #[arg(long, global = true, env = "TOKENVAULT_DB")]
    pub db: Option<String>,

    /// Path to the vault key file (overrides .tokenvault.toml)
    #[arg(long, global = true)]
    pub key_file: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// The `(tenant, class, identifier)` triple addressing a secret.
#[derive(clap::Args, Debug, Clone)]
pub struct KeyArgs {
    /// Owning tenant (site) id
    pub tenant_id: String,
    /// Secret class (e.g. email, api_key)
    pub secret_class: String,
    /// Identifier within the class (e.g. a mailbox address)
    pub identifier: String,
}

impl KeyArgs {
    /// Validated key, for audit entries.
    pub fn to_key(&self) -> Result<SecretKey> {
        SecretKey::new(&self.tenant_id, &self.secret_class, &self.identifier)
    }
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate a new vault key file
    Keygen {
        /// Path for the key file (default: from .tokenvault.toml)
        path: Option<String>,
    },

    /// Show the fingerprint of the vault key in use
    Fingerprint {
        /// Fail unless the key matches this fingerprint
        #[arg(long)]
        expect: Option<String>,
    },

    /// Store a secret's verifier (add or replace)
    Store {
        #[command(flatten)]
        key: KeyArgs,
        /// Secret value (omit for interactive prompt or stdin)
        value: Option<String>,
    },

    /// Check a candidate secret against the stored verifier
    Verify {
        #[command(flatten)]
        key: KeyArgs,
        /// Candidate value (omit for interactive prompt or stdin)
        value: Option<String>,
    },

    /// Check whether a secret is stored
    Check {
        #[command(flatten)]
        key: KeyArgs,
    },

    /// Delete a stored secret
    Delete {
        #[command(flatten)]
        key: KeyArgs,
        /// Delete from the sealed store instead of the verifier store
        #[arg(long)]
        sealed: bool,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List a tenant's stored secrets (metadata only)
    List {
        /// Tenant id
        tenant_id: String,
    },

    /// Seal a secret that must be read back later (e.g. an SMTP password)
    Seal {
        #[command(flatten)]
        key: KeyArgs,
        /// Secret value (omit for interactive prompt or stdin)
        value: Option<String>,
    },

    /// Print a sealed secret
    Reveal {
        #[command(flatten)]
        key: KeyArgs,
    },

    /// Handle one JSON request from stdin and print the JSON response
    Dispatch,

    /// View the audit log of vault operations
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Install the global tracing subscriber.
///
/// Logs go to stderr so stdout stays clean for `reveal` and `dispatch`.
/// `RUST_LOG` wins over `--verbose` when set.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tokenvault={default_level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .try_init();
}

/// Load settings from the current directory.
pub fn load_settings() -> Result<(PathBuf, Settings)> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;
    Ok((cwd, settings))
}

/// Full path to the vault database, honouring `--db`.
pub fn database_path(cli: &Cli) -> Result<PathBuf> {
    let (cwd, settings) = load_settings()?;
    Ok(match &cli.db {
        Some(path) => cwd.join(path),
        None => settings.database_path(&cwd),
    })
}

/// Full path to the key file, honouring `--key-file`.
pub fn key_file_path(cli: &Cli) -> Result<PathBuf> {
    let (cwd, settings) = load_settings()?;
    Ok(match &cli.key_file {
        Some(path) => cwd.join(path),
        None => settings.key_file_path(&cwd),
    })
}

/// Load the vault key, trying in order:
/// 1. `TOKENVAULT_KEY` env var (base64)
/// 2. `--key-file`, or the `key_file` setting
pub fn load_vault_key(cli: &Cli) -> Result<Arc<VaultKey>> {
    if let Some(key) = VaultKey::from_env()? {
        tracing::debug!("vault key loaded from environment");
        return Ok(Arc::new(key));
    }

    let path = key_file_path(cli)?;
    let key = keyfile::load_keyfile(&path)?;
    tracing::debug!(path = %path.display(), "vault key loaded from file");
    Ok(Arc::new(key))
}

/// Open the verification vault configured for this directory.
pub fn open_vault(cli: &Cli) -> Result<CredentialVault<SqliteStore>> {
    let (_, settings) = load_settings()?;
    let key = load_vault_key(cli)?;
    let store = SqliteStore::open(
        &database_path(cli)?,
        RecordTable::Verifiers,
        settings.busy_timeout(),
    )?;
    CredentialVault::new(store, &key, settings.build_hasher()?)
}

/// Open the sealed store configured for this directory.
pub fn open_sealed(cli: &Cli) -> Result<SealedStore<SqliteStore>> {
    let (_, settings) = load_settings()?;
    let key = load_vault_key(cli)?;
    let store = SqliteStore::open(
        &database_path(cli)?,
        RecordTable::Sealed,
        settings.busy_timeout(),
    )?;
    Ok(SealedStore::new(store, key))
}

/// Read a secret from one of three sources: the command line (with a
/// shell-history warning), piped stdin, or a hidden interactive prompt.
///
/// Returns `Zeroizing<String>` so the value is wiped from memory on drop.
pub fn read_secret(value: Option<&str>, prompt: &str) -> Result<Zeroizing<String>> {
    if let Some(v) = value {
        output::warning("Value provided on command line: it may appear in shell history.");
        return Ok(Zeroizing::new(v.to_string()));
    }

    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = Zeroizing::new(buf.trim_end_matches(['\r', '\n']).to_string());
        return Ok(trimmed);
    }

    let pw = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| TokenVaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Log an audit event next to the vault database.
///
/// Never fails the parent operation.
pub fn log_audit(cli: &Cli, op: &str, key: Option<&SecretKey>, outcome: Option<&str>) {
    let Ok(db_path) = database_path(cli) else {
        return;
    };
    let Some(dir) = db_path.parent() else {
        return;
    };

    if let Some(audit) = AuditLog::open(dir) {
        audit.log(op, key, outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_key_triple() {
        let cli = Cli::parse_from(["tokenvault", "check", "t1", "email", "a@b.com"]);
        match cli.command {
            Commands::Check { key } => {
                assert_eq!(key.tenant_id, "t1");
                assert_eq!(key.secret_class, "email");
                assert_eq!(key.identifier, "a@b.com");
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "tokenvault",
            "list",
            "t1",
            "--db",
            "other.db",
            "--verbose",
        ]);
        assert_eq!(cli.db.as_deref(), Some("other.db"));
        assert!(cli.verbose);
    }

    #[test]
    fn key_args_validate() {
        let ok = KeyArgs {
            tenant_id: "t1".into(),
            secret_class: "email".into(),
            identifier: "a@b.com".into(),
        };
        assert!(ok.to_key().is_ok());

        let bad = KeyArgs {
            identifier: String::new(),
            ..ok
        };
        assert!(bad.to_key().is_err());
    }
}
