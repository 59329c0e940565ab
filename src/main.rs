use clap::Parser;
use tokenvault::cli::commands;
use tokenvault::cli::{init_tracing, Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Keygen { ref path } => commands::keygen::execute(&cli, path.as_deref()),
        Commands::Fingerprint { ref expect } => {
            commands::fingerprint::execute(&cli, expect.as_deref())
        }
        Commands::Store { ref key, ref value } => {
            commands::store::execute(&cli, key, value.as_deref())
        }
        Commands::Verify { ref key, ref value } => {
            commands::verify::execute(&cli, key, value.as_deref())
        }
        Commands::Check { ref key } => commands::check::execute(&cli, key),
        Commands::Delete {
            ref key,
            sealed,
            force,
        } => commands::delete::execute(&cli, key, sealed, force),
        Commands::List { ref tenant_id } => commands::list::execute(&cli, tenant_id),
        Commands::Seal { ref key, ref value } => {
            commands::seal::execute(&cli, key, value.as_deref())
        }
        Commands::Reveal { ref key } => commands::reveal::execute(&cli, key),
        Commands::Dispatch => commands::dispatch::execute(&cli),
        Commands::Audit { last, ref since } => {
            commands::audit_cmd::execute(&cli, last, since.as_deref())
        }
        Commands::Completions { ref shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        tracing::debug!(kind = e.kind(), retryable = e.is_retryable(), "command failed");
        tokenvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
