//! Shim binary so `cargo run` and integration tests get a `hostwatch` executable.

use clap::Parser as _;
use hostwatch_monitor::cli::Cli;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    hostwatch_monitor::inner_main(Cli::parse()).await
}
