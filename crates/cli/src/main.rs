//! gsw - write lines to Cloud Storage or local files
//!
//! Destinations of the form gs://bucket/key go to Cloud Storage, anything
//! else is created on the local filesystem.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod exit_code;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Open events go to stderr at info level unless output is quiet or JSON
    let default_level = if cli.quiet || cli.json { "warn" } else { "info" };
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
