//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command. Status lines go to stderr
//! when stdout may carry a secret or JSON.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::store::RecordSummary;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of record metadata (Class, Identifier, Last used, Updated).
pub fn print_records_table(tenant_id: &str, records: &[RecordSummary]) {
    if records.is_empty() {
        info(&format!("No secrets stored for tenant '{tenant_id}'."));
        tip("Run `tokenvault store <TENANT> <CLASS> <IDENTIFIER>` to add one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Class", "Identifier", "Last used", "Updated"]);

    for r in records {
        let last_used = r.last_used_at.map_or_else(
            || "never".to_string(),
            |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
        );
        table.add_row(vec![
            r.key.secret_class().to_string(),
            r.key.identifier().to_string(),
            last_used,
            r.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    println!("{table}");
}
