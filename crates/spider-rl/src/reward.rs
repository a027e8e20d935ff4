//! Reward shaping for spider training
//!
//! Two modes, chosen by `RewardConfig::reward_mode`:
//! - TARGET_MODE: distance-to-target shaping minus time and heading penalties
//! - NO_TARGET_MODE: lateral drift penalty plus triangular-weighted forward
//!   progress over the pre-z history
//!
//! NO_TARGET_MODE is provisional. The trainer does not feed robot positions
//! through the observation yet, so `compute_reward` yields 0.0 for it and the
//! formula is only reachable through [`no_target_reward`].

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use spider_core::{Observation, Result, RewardMode, SpiderError};

use crate::config::RewardConfig;
use crate::queue::PreZQueue;
use crate::Reward;

/// Individual terms of a TARGET_MODE reward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    pub distance_reward: f64,
    pub time_penalty: f64,
    pub angle_penalty: f64,
    pub total: Reward,
}

impl RewardBreakdown {
    fn zero() -> Self {
        Self {
            distance_reward: 0.0,
            time_penalty: 0.0,
            angle_penalty: 0.0,
            total: 0.0,
        }
    }
}

/// Reward shaper bound to a validated configuration
#[derive(Debug, Clone)]
pub struct RewardShaper {
    config: RewardConfig,
}

impl RewardShaper {
    /// Create a shaper, rejecting configurations that break the mode invariants
    pub fn new(config: RewardConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            "Reward shaper ready: mode={}, pre_z_queue_size={}",
            config.reward_mode, config.pre_z_queue_size
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    pub fn mode(&self) -> RewardMode {
        self.config.reward_mode
    }

    /// Reward for one tick
    pub fn compute(
        &self,
        observation: &Observation,
        pre_z: &mut PreZQueue,
        step_counter: u64,
    ) -> Result<Reward> {
        Ok(self.breakdown(observation, pre_z, step_counter)?.total)
    }

    /// Reward for one tick, split into its terms
    pub fn breakdown(
        &self,
        observation: &Observation,
        _pre_z: &mut PreZQueue,
        step_counter: u64,
    ) -> Result<RewardBreakdown> {
        Ok(evaluate(observation, step_counter, &self.config))
    }
}

/// Validate `config` and compute the reward for one tick.
///
/// Fails before computing anything when the configuration is invalid. The
/// pre-z history is taken by `&mut` because NO_TARGET_MODE rotates it; the
/// current modes leave it untouched.
pub fn compute_reward(
    observation: &Observation,
    _pre_z: &mut PreZQueue,
    step_counter: u64,
    config: &RewardConfig,
) -> Result<Reward> {
    config.validate()?;
    Ok(evaluate(observation, step_counter, config).total)
}

fn evaluate(
    observation: &Observation,
    step_counter: u64,
    config: &RewardConfig,
) -> RewardBreakdown {
    match config.reward_mode {
        RewardMode::TargetMode => target_reward(observation, step_counter, config),
        RewardMode::NoTargetMode => {
            trace!("NO_TARGET_MODE reward is not wired to the observation, returning 0");
            RewardBreakdown::zero()
        }
    }
}

/// TARGET_MODE reward.
///
/// The distance term uses the squared planar distance, not its square root.
fn target_reward(
    observation: &Observation,
    step_counter: u64,
    config: &RewardConfig,
) -> RewardBreakdown {
    let current_sq_dist = observation.squared_target_distance();
    let distance_delta = config.spider_target_init_dist - current_sq_dist;

    let distance_reward = distance_delta * config.distance_reward_weight;
    let time_penalty = step_counter as f64 * config.time_penalty_weight;
    let angle_penalty = observation.offset_angle * config.angle_reward_weight;

    debug!("Forward distance {}", distance_delta);

    RewardBreakdown {
        distance_reward,
        time_penalty,
        angle_penalty,
        total: distance_reward - time_penalty - angle_penalty,
    }
}

/// NO_TARGET_MODE reward for a robot at `(x, z)`.
///
/// Entry `i` of the history (oldest first) gets weight `K - i` and the
/// weighted sum is normalised by `K(K+1)/2`. The queue is read with
/// rotate-and-restore and comes back unchanged.
///
/// Fails when `config` is invalid or when the queue was not sized for
/// `pre_z_queue_size`.
pub fn no_target_reward(
    x: f64,
    z: f64,
    pre_z: &mut PreZQueue,
    config: &RewardConfig,
) -> Result<Reward> {
    config.validate()?;

    let k = config.pre_z_queue_size;
    if pre_z.capacity() != k {
        return Err(SpiderError::Config(format!(
            "pre-z history holds {} entries, pre_z_queue_size is {}",
            pre_z.capacity(),
            k
        )));
    }
    let history = pre_z.peek_rotate()?;

    let reward_offset_x = config.x_multiply_param * (x - config.x_init_value).abs();

    let weighted: f64 = history
        .iter()
        .take(k)
        .enumerate()
        .map(|(i, pre)| (z - pre) * (k - i) as f64)
        .sum();
    let normaliser = ((1 + k) * k) as f64 / 2.0;
    let reward_forward_z = weighted * config.z_multiply_param / normaliser;

    Ok(reward_offset_x + reward_forward_z)
}
