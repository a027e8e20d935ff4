//! Configuration loading for spiderctl

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

use spider_rl::{ControlConfig, RewardConfig, RouterThresholds};

/// Effective configuration of the CLI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reward: RewardConfig,
    pub router: RouterThresholds,
    pub control: ControlConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from file and environment, then validate it.
    ///
    /// An explicitly given file must exist; otherwise the standard
    /// locations are searched and a missing file means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = explicit.map(Path::to_path_buf).or_else(Self::find_config_file);

        let mut builder = ConfigBuilder::<config::builder::DefaultState>::default();

        if let Some(path) = &config_path {
            builder = builder.add_source(File::from(path.clone()).required(explicit.is_some()));
        }

        // Environment variables with SPIDER__ prefix, e.g. SPIDER__ROUTER__TO_FORWARD=25
        builder = builder.add_source(
            Environment::with_prefix("SPIDER")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document on its own, without environment overrides
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section's invariants
    pub fn validate(&self) -> Result<()> {
        self.reward.validate().context("Invalid [reward] section")?;
        self.router.validate().context("Invalid [router] section")?;
        self.control.validate().context("Invalid [control] section")?;
        Ok(())
    }

    /// Render as a TOML document
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Find the configuration file
    pub fn find_config_file() -> Option<PathBuf> {
        // Check in order: SPIDER_CONFIG env, ./spider.toml, ~/.config/spider/spider.toml
        if let Ok(path) = std::env::var("SPIDER_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let local = PathBuf::from("spider.toml");
        if local.exists() {
            return Some(local);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".config").join("spider").join("spider.toml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        None
    }
}
