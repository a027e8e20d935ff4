//! Policy router - picks the forward or redirect policy for the next tick
//!
//! Switching uses two thresholds on |heading error|. Forward hands over at
//! `to_redirect`, Redirect hands back at `to_forward`; between the two the
//! active policy is kept, which stops the controller from toggling every
//! tick near a single boundary.
//!
//! The router holds no state of its own. Callers thread the active policy
//! through successive calls.

use tracing::{debug, trace};

use spider_core::{PolicyKind, Result, SpiderError};

use crate::config::RouterThresholds;

/// Next policy given the heading error (degrees) and the active policy.
///
/// | current  | |angle|          | next     |
/// |----------|-----------------|----------|
/// | Forward  | < to_redirect   | Forward  |
/// | Forward  | >= to_redirect  | Redirect |
/// | Redirect | > to_forward    | Redirect |
/// | Redirect | <= to_forward   | Forward  |
pub fn decide(
    angle: f64,
    current: PolicyKind,
    thresholds: &RouterThresholds,
) -> Result<PolicyKind> {
    if !angle.is_finite() {
        return Err(SpiderError::InvalidAngle(angle));
    }

    let magnitude = angle.abs();
    let next = match current {
        PolicyKind::Forward if magnitude < thresholds.to_redirect => PolicyKind::Forward,
        PolicyKind::Forward => PolicyKind::Redirect,
        PolicyKind::Redirect if magnitude > thresholds.to_forward => PolicyKind::Redirect,
        PolicyKind::Redirect => PolicyKind::Forward,
    };

    trace!("route angle={:.2} {} -> {}", angle, current, next);
    Ok(next)
}

/// Router bound to a fixed pair of thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyRouter {
    thresholds: RouterThresholds,
}

impl PolicyRouter {
    pub fn new(thresholds: RouterThresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &RouterThresholds {
        &self.thresholds
    }

    /// Next policy for this tick
    pub fn decide(&self, angle: f64, current: PolicyKind) -> Result<PolicyKind> {
        decide(angle, current, &self.thresholds)
    }

    /// Replay a sequence of heading errors, returning the policy after each one
    pub fn replay(&self, angles: &[f64], start: PolicyKind) -> Result<Vec<PolicyKind>> {
        let mut current = start;
        let mut states = Vec::with_capacity(angles.len());

        for &angle in angles {
            let next = self.decide(angle, current)?;
            if next != current {
                debug!("Policy switch at angle {:.2}: {} -> {}", angle, current, next);
            }
            states.push(next);
            current = next;
        }

        Ok(states)
    }
}

impl Default for PolicyRouter {
    fn default() -> Self {
        Self {
            thresholds: RouterThresholds::default(),
        }
    }
}
