use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ankitoggl", version, about = "Sync Anki review time to Toggl Track")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync today's review time to Toggl
    Sync {
        /// Path to the Anki collection database (overrides config)
        #[arg(long)]
        collection: Option<PathBuf>,
        /// IANA timezone to use (overrides config)
        #[arg(long)]
        timezone: Option<String>,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Show sync ledger state
    Status {
        /// List every recorded sync, not just today's
        #[arg(long)]
        all: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ankitoggl=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Sync {
            collection,
            timezone,
            json,
        } => commands::sync::run(collection, timezone, json),
        Commands::Config { action } => commands::config::run(action),
        Commands::Status { all } => commands::status::run(all),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
