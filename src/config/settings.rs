use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::crypto::hasher::{Argon2Hasher, Argon2Params, SecretHasher, Sha256Hasher};
use crate::errors::{Result, TokenVaultError};

/// Which one-way function backs the verification vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HasherKind {
    /// Single-pass SHA-256 (fast; compatible with existing verifiers).
    Sha256,
    /// Argon2id (memory-hard).
    Argon2id,
}

/// Deployment configuration, loaded from `.tokenvault.toml`.
///
/// Every field has a sensible default so TokenVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// SQLite database holding both record tables.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// File holding the 32-byte vault key. `TOKENVAULT_KEY` takes precedence.
    #[serde(default = "default_key_file")]
    pub key_file: String,

    /// How long a storage call may wait on a locked database.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    #[serde(default = "default_hasher")]
    pub hasher: HasherKind,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_database_path() -> String {
    ".tokenvault/vault.db".to_string()
}

fn default_key_file() -> String {
    ".tokenvault/vault.key".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_hasher() -> HasherKind {
    HasherKind::Sha256
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            key_file: default_key_file(),
            busy_timeout_ms: default_busy_timeout_ms(),
            hasher: default_hasher(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    pub const FILE_NAME: &'static str = ".tokenvault.toml";

    /// Load settings from `<project_dir>/.tokenvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            TokenVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if settings.busy_timeout_ms == 0 {
            return Err(TokenVaultError::ConfigError(
                "busy_timeout_ms must be greater than zero".into(),
            ));
        }

        Ok(settings)
    }

    /// Resolve the database path against `project_dir`.
    pub fn database_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.database_path)
    }

    /// Resolve the key file path against `project_dir`.
    pub fn key_file_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.key_file)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Build the configured hasher.
    pub fn build_hasher(&self) -> Result<Box<dyn SecretHasher>> {
        Ok(match self.hasher {
            HasherKind::Sha256 => Box::new(Sha256Hasher),
            HasherKind::Argon2id => Box::new(Argon2Hasher::new(self.argon2_params())?),
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────
