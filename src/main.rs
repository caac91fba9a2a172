mod cli;
mod config;
mod error;
mod insights;
mod models;
mod output;
mod providers;
mod statistics;
mod transport;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting buildstats");
    cli.execute().await?;

    Ok(())
}
