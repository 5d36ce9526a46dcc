//! Ajeer CLI
//!
//! Inspect and maintain contracts and health certificates from a terminal,
//! against the hosted backend when configured and on-device storage otherwise.

use ajeer_core::{init_logging, open_stores, StorageConfig};
use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "ajeer")]
#[command(about = "Ajeer - contract and health certificate records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show which store is active
    Status,
    /// Contract operations
    Contracts(commands::records::RecordArgs),
    /// Health certificate operations
    Certificates(commands::records::RecordArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = StorageConfig::from_env()?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }
    let stores = open_stores(&config)?;

    match cli.command {
        Commands::Status => commands::status::execute(&config, &stores),
        Commands::Contracts(args) => commands::records::execute(&stores.contracts, args).await,
        Commands::Certificates(args) => {
            commands::records::execute(&stores.certificates, args).await
        }
    }
}
