//! Ledgerutil CLI
//!
//! Command-line interface for ledger snapshot tooling

use clap::{Parser, Subcommand};
use ledgerutil_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "ledgerutil")]
#[command(version)]
#[command(about = "Ledger utility for snapshot comparison", long_about = None)]
struct Cli {
    /// Human-readable debug logs on stderr
    #[arg(long, global = true, conflicts_with = "log_json")]
    verbose: bool,

    /// JSON structured logs on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare two snapshots of the same channel at the same height
    Compare(commands::compare::CompareArgs),
}

fn main() {
    let cli = Cli::parse();

    if cli.log_json {
        init(Profile::Production);
    } else if cli.verbose || std::env::var_os("RUST_LOG").is_some() {
        init(Profile::Development);
    }

    let (label, result) = match cli.command {
        Commands::Compare(args) => ("Ledger Compare Error", commands::compare::execute(args)),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", label, e);
        std::process::exit(1);
    }
}
