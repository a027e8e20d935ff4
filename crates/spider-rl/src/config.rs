//! Reward, router and control-loop configuration
//!
//! All three are immutable snapshots loaded once at start. `validate` is
//! run right after loading so an invalid combination never reaches the
//! reward shaper or the router.

use serde::{Deserialize, Serialize};
use tracing::warn;

use spider_core::{PolicyKind, Result, RewardMode, SpiderError};

/// Reward shaping parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// TARGET_MODE or NO_TARGET_MODE
    pub reward_mode: RewardMode,

    /// Capacity of the pre-z history; must be 1 in TARGET_MODE
    pub pre_z_queue_size: usize,

    /// Lateral start position; drift from it is penalised in NO_TARGET_MODE
    pub x_init_value: f64,

    /// Value the pre-z history is filled with at episode start
    pub z_init_value: f64,

    /// Squared start distance to the target (70^2 for a target 70 units ahead)
    pub spider_target_init_dist: f64,

    pub distance_reward_weight: f64,
    pub time_penalty_weight: f64,
    pub angle_reward_weight: f64,

    /// Multiplier of the lateral offset term (negative: a penalty)
    pub x_multiply_param: f64,

    /// Multiplier of the weighted forward-progress term
    pub z_multiply_param: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            reward_mode: RewardMode::TargetMode,
            pre_z_queue_size: 1,
            x_init_value: 0.0,
            z_init_value: 0.0,
            spider_target_init_dist: 70.0 * 70.0,
            distance_reward_weight: 10.0,
            time_penalty_weight: 1.0,
            angle_reward_weight: 1.0,
            x_multiply_param: -5.0e2,
            z_multiply_param: 1.5e3,
        }
    }
}

impl RewardConfig {
    /// Check the configuration invariants.
    ///
    /// TARGET_MODE only works with a single-entry pre-z history.
    pub fn validate(&self) -> Result<()> {
        if self.pre_z_queue_size == 0 {
            return Err(SpiderError::Config(
                "pre_z_queue_size must be at least 1".to_string(),
            ));
        }

        if self.reward_mode == RewardMode::TargetMode && self.pre_z_queue_size != 1 {
            return Err(SpiderError::Config(format!(
                "TARGET_MODE reward requires pre_z_queue_size = 1, got {}",
                self.pre_z_queue_size
            )));
        }

        let numeric = [
            ("x_init_value", self.x_init_value),
            ("z_init_value", self.z_init_value),
            ("spider_target_init_dist", self.spider_target_init_dist),
            ("distance_reward_weight", self.distance_reward_weight),
            ("time_penalty_weight", self.time_penalty_weight),
            ("angle_reward_weight", self.angle_reward_weight),
            ("x_multiply_param", self.x_multiply_param),
            ("z_multiply_param", self.z_multiply_param),
        ];
        for (name, value) in numeric {
            if !value.is_finite() {
                return Err(SpiderError::Config(format!("{name} must be finite, got {value}")));
            }
        }

        Ok(())
    }
}

/// Hysteresis thresholds of the policy router, in degrees of |heading error|
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterThresholds {
    /// At or above this, Forward hands over to Redirect
    pub to_redirect: f64,
    /// At or below this, Redirect hands back to Forward
    pub to_forward: f64,
}

impl Default for RouterThresholds {
    fn default() -> Self {
        Self {
            to_redirect: 45.0,
            to_forward: 30.0,
        }
    }
}

impl RouterThresholds {
    pub fn new(to_redirect: f64, to_forward: f64) -> Self {
        Self {
            to_redirect,
            to_forward,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("to_redirect", self.to_redirect), ("to_forward", self.to_forward)] {
            if !value.is_finite() || value < 0.0 {
                return Err(SpiderError::Config(format!(
                    "router threshold {name} must be a non-negative finite angle, got {value}"
                )));
            }
        }

        if self.to_forward > self.to_redirect {
            warn!(
                "Router to_forward ({}) exceeds to_redirect ({}): no hysteresis band",
                self.to_forward, self.to_redirect
            );
        }

        Ok(())
    }

    /// Width of the band in which the current policy is kept
    pub fn band_width(&self) -> f64 {
        self.to_redirect - self.to_forward
    }
}

/// Control loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Policy active on the first tick of an episode
    pub initial_policy: PolicyKind,

    /// Training episodes are truncated after this many ticks
    pub reset_scene_step: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            initial_policy: PolicyKind::Forward,
            reset_scene_step: 1024 * 8,
        }
    }
}

impl ControlConfig {
    pub fn validate(&self) -> Result<()> {
        if self.reset_scene_step == 0 {
            return Err(SpiderError::Config(
                "reset_scene_step must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_defaults_are_valid() {
        let config = RewardConfig::default();
        assert_eq!(config.reward_mode, RewardMode::TargetMode);
        assert_eq!(config.pre_z_queue_size, 1);
        assert_eq!(config.spider_target_init_dist, 4900.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_target_mode_requires_single_entry_queue() {
        let config = RewardConfig {
            pre_z_queue_size: 4,
            ..RewardConfig::default()
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(err, SpiderError::Config(_)));
        assert!(err.to_string().contains("pre_z_queue_size = 1"));
    }

    #[test]
    fn test_no_target_mode_allows_longer_queue() {
        let config = RewardConfig {
            reward_mode: RewardMode::NoTargetMode,
            pre_z_queue_size: 4,
            ..RewardConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_queue_size_rejected() {
        let config = RewardConfig {
            reward_mode: RewardMode::NoTargetMode,
            pre_z_queue_size: 0,
            ..RewardConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_weight_rejected() {
        let config = RewardConfig {
            time_penalty_weight: f64::NAN,
            ..RewardConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("time_penalty_weight"));
    }

    #[test]
    fn test_partial_reward_config_uses_defaults() {
        let config: RewardConfig =
            serde_json::from_str(r#"{"reward_mode": "NO_TARGET_MODE", "pre_z_queue_size": 3}"#)
                .unwrap();

        assert_eq!(config.reward_mode, RewardMode::NoTargetMode);
        assert_eq!(config.pre_z_queue_size, 3);
        assert_eq!(config.distance_reward_weight, 10.0);
    }

    #[test]
    fn test_unknown_reward_mode_rejected_at_parse() {
        let result = serde_json::from_str::<RewardConfig>(r#"{"reward_mode": "FAST_MODE"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_router_thresholds() {
        let thresholds = RouterThresholds::default();
        assert_eq!(thresholds.to_redirect, 45.0);
        assert_eq!(thresholds.to_forward, 30.0);
        assert_eq!(thresholds.band_width(), 15.0);
        assert!(thresholds.validate().is_ok());

        assert!(RouterThresholds::new(f64::INFINITY, 30.0).validate().is_err());
        assert!(RouterThresholds::new(45.0, -1.0).validate().is_err());
        // Inverted band is accepted, only warned about
        assert!(RouterThresholds::new(30.0, 45.0).validate().is_ok());
    }

    #[test]
    fn test_control_config() {
        let config = ControlConfig::default();
        assert_eq!(config.initial_policy, PolicyKind::Forward);
        assert_eq!(config.reset_scene_step, 8192);
        assert!(config.validate().is_ok());

        let bad = ControlConfig {
            reset_scene_step: 0,
            ..ControlConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_reward_config_toml() {
        let config: RewardConfig = toml::from_str(
            r#"
            reward_mode = "TARGET_MODE"
            spider_target_init_dist = 100.0
            angle_reward_weight = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.spider_target_init_dist, 100.0);
        assert_eq!(config.angle_reward_weight, 0.5);
        assert_eq!(config.pre_z_queue_size, 1);
    }
}
