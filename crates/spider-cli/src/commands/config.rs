//! Configuration management commands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::Config;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a default spider.toml
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

pub async fn run(cmd: ConfigCommands, explicit: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show(explicit).await,
        ConfigCommands::Init { force } => init(explicit, force).await,
    }
}

async fn show(explicit: Option<&Path>) -> Result<()> {
    println!("Current Configuration");
    println!("=====================\n");

    match explicit.map(Path::to_path_buf).or_else(Config::find_config_file) {
        Some(path) => println!("Config file: {}\n", path.display()),
        None => println!("No configuration file found. Using defaults.\n"),
    }

    let config = Config::load(explicit)?;
    println!("{}", config.to_toml()?);
    Ok(())
}

async fn init(explicit: Option<&Path>, force: bool) -> Result<()> {
    let config_path = explicit.map_or_else(|| PathBuf::from("spider.toml"), Path::to_path_buf);

    if config_path.exists() && !force {
        println!("Configuration file already exists: {}", config_path.display());
        println!("Use --force to overwrite");
        return Ok(());
    }

    write_default(&config_path)?;
    println!("Created configuration file: {}", config_path.display());
    Ok(())
}

fn write_default(path: &Path) -> Result<()> {
    let rendered = Config::default().to_toml()?;
    std::fs::write(path, rendered).with_context(|| format!("Failed to write {}", path.display()))
}
