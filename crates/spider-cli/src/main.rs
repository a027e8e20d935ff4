//! spiderctl - Command line interface for the spider controller
//!
//! Evaluates rewards, replays routing decisions and runs the inference
//! loop against a built-in kinematic simulator.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unused_async)]
#![allow(clippy::cast_precision_loss)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spider_core::util::load_env_file;

mod commands;
mod config;
mod sim;

use commands::{reward, route, simulate, steer};
use config::Config;

#[derive(Parser)]
#[command(name = "spiderctl")]
#[command(author, version, about = "Spider controller tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./spider.toml or ~/.config/spider/spider.toml)
    #[arg(short, long, global = true, env = "SPIDER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the training reward for an observation
    Reward(reward::RewardArgs),

    /// Replay heading errors through the policy router
    Route(route::RouteArgs),

    /// Show the rule-based steering command for a heading error
    Steer(steer::SteerArgs),

    /// Run the inference loop against the kinematic simulator
    Simulate(simulate::SimulateArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(commands::config::ConfigCommands),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from spider.env file (before parsing args)
    load_env_file();

    let cli = Cli::parse();

    // Config commands must work even when the current file is broken
    let config = if matches!(cli.command, Commands::Config(_)) {
        Config::default()
    } else {
        Config::load(cli.config.as_deref())?
    };
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Reward(args) => reward::run(args, &config).await,
        Commands::Route(args) => route::run(args, &config).await,
        Commands::Steer(args) => steer::run(args).await,
        Commands::Simulate(args) => simulate::run(args, &config).await,
        Commands::Config(cmd) => commands::config::run(cmd, cli.config.as_deref()).await,
    }
}

/// Initialize logging based on configuration and verbosity
fn init_logging(config: &Config, verbose: bool) {
    let log_level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("spiderctl={log_level},spider_rl={log_level},spider_core={log_level}").into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
