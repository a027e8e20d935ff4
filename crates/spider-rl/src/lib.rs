//! Spider RL - Reward shaping and policy routing
//!
//! This crate provides the training-time reward shaper, the inference-time
//! policy router, and the control loop that ties the router to externally
//! supplied policies and environments.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]

pub mod config;
pub mod control;
pub mod episode;
pub mod queue;
pub mod reward;
pub mod router;

pub use config::{ControlConfig, RewardConfig, RouterThresholds};
pub use control::{Environment, InferenceLoop, LoopStats, Policy, PolicyBinding};
pub use episode::{Episode, StepCounter};
pub use queue::PreZQueue;
pub use reward::{compute_reward, no_target_reward, RewardBreakdown, RewardShaper};
pub use router::{decide, PolicyRouter};

/// Reward value handed back to the trainer
pub type Reward = f64;
