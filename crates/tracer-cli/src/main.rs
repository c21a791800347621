//! Tracer CLI
//!
//! Command-line interface for reviewing tracer-study data requests

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use config::Config;

#[derive(Debug, Parser)]
#[command(name = "tracer")]
#[command(about = "Tracer study data request administration", long_about = None)]
struct Cli {
    /// Store path (overrides TRACER_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Data request operations
    Request(commands::request::RequestArgs),
    /// Query preview, checking and history
    Query(commands::query::QueryArgs),
}

fn main() {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env(cli.db);
    tracer_core::logging_facility::init(config.log_profile);

    let result = match cli.command {
        Commands::Request(args) => commands::request::execute(args, &config),
        Commands::Query(args) => commands::query::execute(args, &config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
