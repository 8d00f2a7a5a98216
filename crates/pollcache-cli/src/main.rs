//! pollcache - replay poll vote collections from the command line.
//!
//! Loads a fixture into the in-memory backend, drives one live collection
//! through a script of fetches and vote mutations, and prints what the
//! collection holds.

mod cli;
mod commands;
mod output;
mod script;

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::replay;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match cli.command {
        Commands::Replay(args) => replay::run(args).await,
    }
}

/// Logs go to stderr; stdout is reserved for snapshots.
fn init_logging(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_directives()));
    let layer = if cli.json_logs {
        fmt::layer().json().with_writer(io::stderr).boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(io::stderr)
            .boxed()
    };

    tracing_subscriber::registry().with(filter).with(layer).init();
}
