//! # xpld Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the xpld CLI application.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the appropriate command handler
//!
//! ## Architecture
//!
//! - Each top-level command (`create`, `extract`, `inspect`) is a variant in
//!   the `Commands` enum, mapped to a handler in its module
//! - All errors are propagated to this level and reported as one line on
//!   stderr with exit status 1
//!
//! ## Examples
//!
//! ```bash
//! # Get help
//! xpld --help
//!
//! # Archive a directory, then list it as a tree with debug logging
//! xpld create ./site -o site.tar.zst
//! xpld -vv inspect site.tar.zst --tree
//! ```
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // create, extract, inspect
mod common; // Archive formats, filesystem helpers, terminal formatting
mod core; // Errors and configuration

/// Defines the top-level command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "xpld",
    about = "xpld: compress, extract, or inspect archive files",
    long_about = "Create, extract, and list tar (plain, gzip, xz, zstd, bzip2) and zip archives.\n\
                  The listing can be filtered, sorted, and printed as text, JSON, or a tree.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Enum defining all available top-level commands.
#[derive(Parser, Debug)]
enum Commands {
    /// Create an archive from a file or directory
    #[command(alias = "c")]
    Create(commands::create::CreateArgs),
    /// Extract an archive into a directory
    #[command(alias = "e")]
    Extract(commands::extract::ExtractArgs),
    /// List the contents of an archive
    #[command(alias = "i")]
    Inspect(commands::inspect::InspectArgs),
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version are reported through clap and exit 0.
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let rendered = e.to_string();
            let message = rendered.lines().next().unwrap_or_default();
            eprintln!("Error: {}", message.trim_start_matches("error: "));
            std::process::exit(1);
        }
    };

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Create(args) => commands::create::handle_create(args),
        Commands::Extract(args) => commands::extract::handle_extract(args),
        Commands::Inspect(args) => commands::inspect::handle_inspect(args),
    };

    if let Err(e) = command_result {
        tracing::debug!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
