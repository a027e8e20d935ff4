//! Spider Core - Core types and shared functionality
//!
//! This crate provides the observation schema, policy identifiers, error
//! type and heading geometry shared by the reward shaper and the policy
//! router.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod heading;
pub mod observation;
pub mod types;
pub mod util;

pub use error::{Result, SpiderError};
pub use heading::SteeringAction;
pub use observation::Observation;
pub use types::{PolicyKind, RewardMode};
