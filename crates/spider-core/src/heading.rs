//! Heading geometry and the rule-based steering fallback
//!
//! The perception side uses these to turn a robot pose and a target
//! position into the signed `offset_angle` carried by every observation.
//! Positive angles mean the target lies counter-clockwise of the heading.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpiderError};

/// Yaw in degrees from the `z`/`w` components of a planar quaternion
pub fn yaw_from_quaternion(z: f64, w: f64) -> f64 {
    (2.0 * z.atan2(w)).to_degrees()
}

/// Signed heading error from a robot pose to a target, in `(-180, 180]`.
///
/// `yaw_deg` is the robot heading; positions are planar `(x, y)` pairs.
pub fn heading_error(yaw_deg: f64, position: (f64, f64), target: (f64, f64)) -> f64 {
    let dx = target.0 - position.0;
    let dy = target.1 - position.1;

    let bearing = dy.atan2(dx);
    let diff = (bearing - yaw_deg.to_radians()).to_degrees().rem_euclid(360.0);

    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// Heading error for a robot whose orientation is given as a planar quaternion
pub fn heading_error_from_quaternion(
    z: f64,
    w: f64,
    position: (f64, f64),
    target: (f64, f64),
) -> f64 {
    heading_error(yaw_from_quaternion(z, w), position, target)
}

/// Discrete steering command picked from the heading error alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SteeringAction {
    Forward,
    LeftFront,
    RightFront,
    CounterclockwiseRotation,
    ClockwiseRotation,
}

impl SteeringAction {
    /// Inner band: walk straight
    pub const FORWARD_LIMIT: f64 = 20.0;
    /// Outer band: arc towards the target, beyond it rotate in place
    pub const ARC_LIMIT: f64 = 40.0;

    /// Pick a steering command for a heading error in degrees.
    ///
    /// The exact band edges (20 and 40) fall through to rotation.
    pub fn choose(angle: f64) -> Result<Self> {
        if !angle.is_finite() {
            return Err(SpiderError::InvalidAngle(angle));
        }

        let magnitude = angle.abs();
        let action = if magnitude < Self::FORWARD_LIMIT {
            SteeringAction::Forward
        } else if Self::FORWARD_LIMIT < magnitude && magnitude < Self::ARC_LIMIT {
            if angle > 0.0 {
                SteeringAction::LeftFront
            } else {
                SteeringAction::RightFront
            }
        } else if angle > 0.0 {
            SteeringAction::CounterclockwiseRotation
        } else {
            SteeringAction::ClockwiseRotation
        };

        Ok(action)
    }
}

impl std::fmt::Display for SteeringAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SteeringAction::Forward => "FORWARD",
            SteeringAction::LeftFront => "LEFT_FRONT",
            SteeringAction::RightFront => "RIGHT_FRONT",
            SteeringAction::CounterclockwiseRotation => "COUNTERCLOCKWISE_ROTATION",
            SteeringAction::ClockwiseRotation => "CLOCKWISE_ROTATION",
        };
        f.write_str(name)
    }
}
