//! Command-line definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Scoped-resource demonstrations and a cached question fetcher
#[derive(Debug, Parser)]
#[command(name = "warden", version, about)]
pub struct Cli {
    /// Configuration file (defaults to ./warden.toml when present)
    #[arg(short, long, global = true, env = "WARDEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the scoped-block demonstration scenarios
    Demo,
    /// Fetch question bodies and print them
    Fetch(FetchArgs),
    /// Prefetch questions and report their status
    Status(StatusArgs),
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Question ids
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Write bodies to this file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub limits: LimitArgs,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Question ids
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// How long to wait for each fetch before reporting, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub wait_ms: u64,

    #[command(flatten)]
    pub limits: LimitArgs,
}

/// Overrides for the `[fetch]` configuration section
#[derive(Debug, Args)]
pub struct LimitArgs {
    /// Per-fetch timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Largest accepted body in bytes
    #[arg(long)]
    pub max_size: Option<usize>,
}
