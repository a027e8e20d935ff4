//! Per-episode bookkeeping for the training side

use serde::{Deserialize, Serialize};
use tracing::debug;

use spider_core::{Observation, Result};

use crate::config::{ControlConfig, RewardConfig};
use crate::queue::PreZQueue;
use crate::reward::RewardShaper;
use crate::Reward;

/// Ticks elapsed in the current episode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StepCounter(u64);

impl StepCounter {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Count one tick
    pub fn increment(&mut self) -> u64 {
        self.0 = self.0.saturating_add(1);
        self.0
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

impl std::fmt::Display for StepCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State the trainer carries across the ticks of one episode
#[derive(Debug, Clone)]
pub struct Episode {
    steps: StepCounter,
    pre_z: PreZQueue,
    z_init_value: f64,
    reset_scene_step: u64,
    episodes_started: u64,
}

impl Episode {
    pub fn new(reward: &RewardConfig, control: &ControlConfig) -> Self {
        Self {
            steps: StepCounter::new(),
            pre_z: PreZQueue::filled(reward.pre_z_queue_size, reward.z_init_value),
            z_init_value: reward.z_init_value,
            reset_scene_step: control.reset_scene_step,
            episodes_started: 1,
        }
    }

    /// Start a new episode: zero the step counter and refill the history
    pub fn reset(&mut self) {
        self.steps.reset();
        self.pre_z.fill(self.z_init_value);
        self.episodes_started += 1;
        debug!("Episode {} started", self.episodes_started);
    }

    /// Reward for the current tick, then count the tick and record `z`
    pub fn step(
        &mut self,
        shaper: &RewardShaper,
        observation: &Observation,
        z: f64,
    ) -> Result<Reward> {
        let reward = shaper.compute(observation, &mut self.pre_z, self.steps.get())?;
        self.steps.increment();
        self.pre_z.push(z);
        Ok(reward)
    }

    /// True once the episode has run for `reset_scene_step` ticks
    pub fn is_truncated(&self) -> bool {
        self.steps.get() >= self.reset_scene_step
    }

    pub fn steps(&self) -> StepCounter {
        self.steps
    }

    pub fn pre_z(&self) -> &PreZQueue {
        &self.pre_z
    }

    pub fn pre_z_mut(&mut self) -> &mut PreZQueue {
        &mut self.pre_z
    }

    pub fn episodes_started(&self) -> u64 {
        self.episodes_started
    }
}
