//! TokenVault: tenant-scoped credential storage.
//!
//! Secrets are kept either as salted, peppered one-way verifiers
//! ([`vault::CredentialVault`]) or, when they must be read back, sealed
//! with AES-256-GCM ([`vault::SealedStore`]).

pub mod audit;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod store;
pub mod vault;
