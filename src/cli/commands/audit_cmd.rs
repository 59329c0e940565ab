//! `tokenvault audit`: display the audit log.
//!
//! Usage:
//!   tokenvault audit               # show last 50 entries
//!   tokenvault audit --last 20     # show last 20
//!   tokenvault audit --since 7d    # entries from last 7 days

use chrono::{DateTime, Utc};

use crate::audit::{AuditEntry, AuditLog};
use crate::cli::output;
use crate::cli::{database_path, Cli};
use crate::errors::{Result, TokenVaultError};

/// Execute the `audit` command.
pub fn execute(cli: &Cli, last: usize, since: Option<&str>) -> Result<()> {
    let db_path = database_path(cli)?;
    let dir = db_path
        .parent()
        .ok_or_else(|| TokenVaultError::AuditError("database path has no parent".into()))?;

    let audit = AuditLog::open(dir)
        .ok_or_else(|| TokenVaultError::AuditError("failed to open audit database".into()))?;

    let since_dt = since.map(parse_duration).transpose()?;
    let entries = audit.query(last, since_dt)?;

    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    print_audit_table(&entries);
    Ok(())
}

/// Parse a human-friendly duration string like "7d", "24h", "30m" into
/// the instant that long ago.
fn parse_duration(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    let invalid = || {
        TokenVaultError::CommandFailed(format!(
            "invalid duration '{input}' (use a format like 7d, 24h, or 30m)"
        ))
    };

    let (num_str, to_duration): (&str, fn(i64) -> Option<chrono::Duration>) =
        if let Some(s) = input.strip_suffix('d') {
            (s, chrono::Duration::try_days)
        } else if let Some(s) = input.strip_suffix('h') {
            (s, chrono::Duration::try_hours)
        } else if let Some(s) = input.strip_suffix('m') {
            (s, chrono::Duration::try_minutes)
        } else {
            return Err(invalid());
        };

    let num: i64 = num_str.parse().map_err(|_| invalid())?;
    if num < 0 {
        return Err(invalid());
    }

    to_duration(num)
        .and_then(|d| Utc::now().checked_sub_signed(d))
        .ok_or_else(invalid)
}

/// Print audit entries in a formatted table.
fn print_audit_table(entries: &[AuditEntry]) {
    use comfy_table::{ContentArrangement, Table};
    use console::style;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Tenant", "Class", "Identifier", "Outcome"]);

    let dash = |v: &Option<String>| v.as_deref().unwrap_or("-").to_string();

    for entry in entries {
        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            colorize_operation(&entry.operation),
            dash(&entry.tenant_id),
            dash(&entry.secret_class),
            dash(&entry.identifier),
            dash(&entry.outcome),
        ]);
    }

    println!(
        "{}",
        style(format!("{} audit entries:", entries.len())).bold()
    );
    println!("{table}");
}

fn colorize_operation(op: &str) -> String {
    use console::style;

    match op {
        "store" | "seal" => style(op).green().to_string(),
        "verify" => style(op).blue().to_string(),
        "delete" | "delete_sealed" => style(op).red().to_string(),
        "reveal" | "keygen" => style(op).yellow().to_string(),
        "dispatch" => style(op).cyan().to_string(),
        _ => op.to_string(),
    }
}
