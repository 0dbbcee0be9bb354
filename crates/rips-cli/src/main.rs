//! # rips CLI entry point
//!
//! Parses command-line arguments, initializes logging, and dispatches to
//! subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rips_cli::check::{run_check, CheckArgs};
use rips_cli::resolve::{run_resolve, ResolveArgs};
use rips_cli::EXIT_ERROR;

/// RIPS — RISC-V ISA privileged-spec checker.
///
/// Validates hardware-configuration YAML against a schema, fills in
/// defaults that depend on the declared extensions, and writes the
/// normalized document.
#[derive(Parser, Debug)]
#[command(name = "rips", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a document and write its normalized form.
    Check(CheckArgs),

    /// Show the dependency-rule resolutions for a document.
    Resolve(ResolveArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "rips starting");

    let result = match cli.command {
        Commands::Check(args) => run_check(&args),
        Commands::Resolve(args) => run_resolve(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
