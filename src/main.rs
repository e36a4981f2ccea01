mod commands;
mod output;

use std::process::ExitCode;

use clap::Parser;
use mnemon::{Config, Error, MemoryStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::{Commands, execute};
use output::{ErrorResponse, print_json};

/// mnemon - Semantic memory for agents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    // Logs go to stderr so JSON on stdout stays parseable
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            if cli.json {
                let response = ErrorResponse {
                    error: e.to_string(),
                };
                if print_json(&response).is_err() {
                    eprintln!("Error: {e}");
                }
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Error> {
    // Version needs no model download or database
    if let Commands::Version = cli.command {
        return commands::handle_version(cli.json);
    }

    let config = Config::load()?;
    let mut store = MemoryStore::from_config(&config)?;
    let code = execute(&cli.command, &mut store, &config, cli.json)?;
    store.close()?;
    Ok(code)
}
