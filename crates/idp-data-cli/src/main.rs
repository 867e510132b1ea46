//! idp-data CLI - Command-line interface for identity server data export and import.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod output;

use commands::{export, import, inspect};
use config::TransferConfig;

#[derive(Parser)]
#[command(name = "idp-data")]
#[command(about = "Identity server data export and import CLI")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, env = "IDP_DATA_CONFIG")]
    config: Option<PathBuf>,
    /// Log debug diagnostics to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the persisted state as a transfer document
    Export {
        /// Path to the state snapshot
        #[arg(long)]
        state: PathBuf,
        /// Output file (or stdout if not provided)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Issuer recorded as exported-from
        #[arg(long, env = "IDP_DATA_ISSUER")]
        issuer: Option<String>,
        /// Principal recorded as exported-by
        #[arg(long, env = "IDP_DATA_PRINCIPAL")]
        principal: Option<String>,
        /// Write the document without indentation
        #[arg(long)]
        compact: bool,
    },
    /// Import a transfer document into the persisted state
    Import {
        /// Input document (or stdin if not provided)
        input: Option<PathBuf>,
        /// Path to the state snapshot (created if missing)
        #[arg(long)]
        state: PathBuf,
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the top-level sections of a transfer document
    Inspect {
        /// Input document (or stdin if not provided)
        input: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Export {
            state,
            output,
            issuer,
            principal,
            compact,
        } => TransferConfig::load_optional(cli.config.as_deref())
            .map_err(Box::<dyn std::error::Error>::from)
            .and_then(|config| {
                export::run(config.with_overrides(issuer, principal), state, output, compact)
            }),
        Commands::Import { input, state, json } => import::run(input, state, json),
        Commands::Inspect { input, json } => inspect::run(input, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
