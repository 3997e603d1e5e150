//! Binary crate for the `countries` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and search prompts
//! - Human-friendly rendering of the finder's view snapshots

use clap::Parser;

mod cli;
mod logging;
mod render;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    logging::init_logging(&cmd.log_level);
    cmd.run().await
}
