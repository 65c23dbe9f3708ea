//! pagecraft command-line tool

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::Result;
use clap::Parser;
use pagecraft::config::PagecraftConfig;
use pagecraft_cli::{run, Cli, Commands, Context};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    pagecraft::observability::init_with_filter(if cli.verbose { "pagecraft=debug,info" } else { "warn" })?;

    let mut config = PagecraftConfig::load()?;
    if let Some(api_url) = cli.api_url {
        config.api.base_url = api_url;
    }

    match cli.command {
        Commands::Serve(command) => command.execute(config).await,
        command => run(command, &Context::new(config).await?).await,
    }
}
