#![deny(warnings)]

//! `roi`: run the ROI calculators and export their PDF reports.

mod args;
mod run;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr so --json output stays parseable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = args::Cli::parse();
    info!(version = args::VERSION, "starting roi");

    Ok(if run::run(cli).await? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
