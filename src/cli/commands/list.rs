//! `tokenvault list`: show a tenant's stored verifiers (metadata only).

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli, tenant_id: &str) -> Result<()> {
    let vault = open_vault(cli)?;
    let records = vault.list(tenant_id)?;
    output::print_records_table(tenant_id, &records);
    Ok(())
}
