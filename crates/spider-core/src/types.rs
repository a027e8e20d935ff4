//! Common types used throughout spider control

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpiderError;

/// The two trained policies the router can hand control to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Forward locomotion towards the target
    Forward,
    /// Turn in place to cancel the heading error
    Redirect,
}

impl PolicyKind {
    /// Both policies, in routing order
    pub const ALL: [PolicyKind; 2] = [PolicyKind::Forward, PolicyKind::Redirect];

    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Forward => "forward",
            PolicyKind::Redirect => "redirect",
        }
    }
}

impl Default for PolicyKind {
    /// Every episode starts walking forward
    fn default() -> Self {
        PolicyKind::Forward
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = SpiderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "forward" => Ok(PolicyKind::Forward),
            "redirect" => Ok(PolicyKind::Redirect),
            other => Err(SpiderError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Reward shaping mode used during training
///
/// Parsed from the exact strings `TARGET_MODE` / `NO_TARGET_MODE`; anything
/// else is rejected when the configuration is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum RewardMode {
    /// Distance-to-target shaping with time and heading penalties
    TargetMode,
    /// Lateral drift penalty plus weighted forward progress
    NoTargetMode,
}

impl RewardMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RewardMode::TargetMode => "TARGET_MODE",
            RewardMode::NoTargetMode => "NO_TARGET_MODE",
        }
    }
}

impl Default for RewardMode {
    fn default() -> Self {
        RewardMode::TargetMode
    }
}

impl std::fmt::Display for RewardMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RewardMode {
    type Err = SpiderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TARGET_MODE" => Ok(RewardMode::TargetMode),
            "NO_TARGET_MODE" => Ok(RewardMode::NoTargetMode),
            other => Err(SpiderError::UnknownRewardMode(other.to_string())),
        }
    }
}

impl TryFrom<String> for RewardMode {
    type Error = SpiderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
