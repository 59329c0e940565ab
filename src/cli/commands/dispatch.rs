//! `tokenvault dispatch`: answer one JSON request read from stdin.
//!
//! Usage:
//!   echo '{"action":"check","tenant_id":"t1","secret_class":"email","identifier":"a@b.com"}' \
//!     | tokenvault dispatch

use std::io::{self, Read};

use zeroize::Zeroizing;

use crate::cli::{log_audit, open_sealed, open_vault, Cli};
use crate::errors::Result;
use crate::vault::Dispatcher;

/// Execute the `dispatch` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut input = Zeroizing::new(String::new());
    io::stdin().read_to_string(&mut input)?;

    let dispatcher = Dispatcher::new(open_vault(cli)?, open_sealed(cli)?);
    let exchange = dispatcher.exchange_json(&input)?;

    // Unparseable requests are still recorded, under the command name.
    let operation = exchange.action.unwrap_or("dispatch");
    log_audit(cli, operation, exchange.key.as_ref(), Some(exchange.outcome));

    println!("{}", exchange.response);
    Ok(())
}
