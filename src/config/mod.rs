//! Deployment configuration (`.tokenvault.toml`).

pub mod settings;

pub use settings::{HasherKind, Settings};
