//! SARMAP service entrypoint.
//!
//! Provides a thin wrapper over the `cli` module: parse args, authenticate
//! with Earth Engine, and serve until the process is stopped.
//! For programmatic use, prefer the library API (`sarmap::api`).

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();
    cli::run(args).await
}
