//! `warden` command-line entry point

mod cli;
mod commands;
mod config;

use clap::Parser;

use crate::cli::{Cli, Command};
use crate::config::CliConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    config.apply_verbosity(cli.verbose);
    let _log = warden_log::init_with(config.log.clone())?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Command::Demo => commands::demo::run(),
        Command::Fetch(args) => commands::fetch::run(&config, args).await,
        Command::Status(args) => commands::status::run(&config, args).await,
    }
}
