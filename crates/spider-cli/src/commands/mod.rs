//! CLI command modules

pub mod config;
pub mod reward;
pub mod route;
pub mod simulate;
pub mod steer;
