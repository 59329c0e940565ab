pub mod audit_cmd;
pub mod check;
pub mod completions;
pub mod delete;
pub mod dispatch;
pub mod fingerprint;
pub mod keygen;
pub mod list;
pub mod reveal;
pub mod seal;
pub mod store;
pub mod verify;
