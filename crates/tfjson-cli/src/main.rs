//! # tfjson CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber, and
//! dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tfjson_cli::fmt::{run_fmt, FmtArgs};
use tfjson_cli::summary::{run_summary, SummaryArgs};
use tfjson_cli::validate::{run_validate, ValidateArgs};
use tfjson_cli::GlobalOptions;
use tfjson_core::DEFAULT_MAX_DEPTH;

/// Inspect plan, state, and configuration JSON documents.
///
/// Log verbosity is controlled with `RUST_LOG`, e.g. `RUST_LOG=debug`.
#[derive(Parser, Debug)]
#[command(name = "tfjson", version, about, long_about = None)]
struct Cli {
    /// Maximum nesting depth of block-list expressions.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a document and check its format version.
    Validate(ValidateArgs),

    /// Re-encode a document with sorted keys.
    Fmt(FmtArgs),

    /// Summarize the changes in a plan.
    Summary(SummaryArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let opts = GlobalOptions {
        max_depth: cli.max_depth,
    };
    tracing::debug!(max_depth = opts.max_depth, "tfjson starting");

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &opts),
        Commands::Fmt(args) => run_fmt(&args, &opts),
        Commands::Summary(args) => run_summary(&args, &opts),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
