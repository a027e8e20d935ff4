//! Utility functions for spider control
//!
//! Provides environment-file loading for the binaries.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Candidate locations of the spider env file, in search order:
/// 1. /usr/local/etc/spider/spider.env
/// 2. User's config directory/spider/spider.env
/// 3. ~/.config/spider/spider.env
pub fn env_file_candidates() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/usr/local/etc/spider/spider.env")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("spider/spider.env"));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config/spider/spider.env"));
    }
    paths
}

/// Load environment variables from the first spider env file found.
/// Variables that are already set are left untouched.
///
/// Returns the file that was read, or `None` when no candidate exists or
/// the first existing one could not be read.
pub fn load_env_file() -> Option<PathBuf> {
    let path = env_file_candidates().into_iter().find(|p| p.exists())?;
    load_env_file_from(&path).then_some(path)
}

/// Read one env file into the environment, returning whether it was read
pub fn load_env_file_from(path: &Path) -> bool {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            debug!("Loading environment from {:?}", path);
            parse_env_file(&contents);
            true
        }
        Err(e) => {
            warn!("Failed to read env file {:?}: {}", path, e);
            false
        }
    }
}

/// Parse env file contents and set environment variables (only if not already set).
/// Supports formats:
/// - `KEY=value`
/// - `export KEY=value`
/// - `KEY="quoted value"`
/// - `KEY='single quoted'`
/// - Comments starting with #
pub fn parse_env_file(contents: &str) {
    for (key, value) in parse_env_lines(contents) {
        if std::env::var(key).is_err() {
            std::env::set_var(key, value);
        }
    }
}

/// Split env file contents into key/value pairs without touching the environment
pub fn parse_env_lines(contents: &str) -> Vec<(&str, &str)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.strip_prefix("export ").unwrap_or(line))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key.trim(), value)
        })
        .collect()
}
