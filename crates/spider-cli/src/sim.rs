//! Planar kinematic stand-in for the spider simulator
//!
//! Good enough to exercise routing: walking drifts the heading a little,
//! turning in place rotates it. Both environments wrap the same body, the
//! way the forward and redirect simulator wrappers share one robot.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use spider_core::heading::heading_error;
use spider_core::{Observation, Result, SpiderError, SteeringAction};
use spider_rl::{Environment, Policy};

/// Motion command: walk `forward` units while turning `turn` degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub forward: f64,
    pub turn: f64,
}

/// Simulation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimParams {
    /// Heading noise per walking step, degrees (uniform, symmetric)
    pub heading_noise: f64,
    /// A target closer than this counts as reached
    pub arrive_radius: f64,
    /// New targets are placed this far from the robot
    pub target_distance: f64,
    pub seed: u64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            heading_noise: 6.0,
            arrive_radius: 2.0,
            target_distance: 70.0,
            seed: 7,
        }
    }
}

/// Robot pose on the ground plane. `z` is the initial forward axis, `x` the
/// lateral one; yaw is measured from +z towards +x.
#[derive(Debug)]
struct Body {
    z: f64,
    x: f64,
    yaw: f64,
    target: (f64, f64),
    targets_reached: u64,
}

impl Body {
    fn start(target_distance: f64) -> Self {
        Self {
            z: 0.0,
            x: 0.0,
            yaw: 0.0,
            target: (target_distance, 0.0),
            targets_reached: 0,
        }
    }

    fn observe(&self) -> Observation {
        let (target_z, target_x) = self.target;
        let mut obs = Observation::new(
            target_x - self.x,
            target_z - self.z,
            heading_error(self.yaw, (self.z, self.x), self.target),
        );
        obs.extra.insert("spider_x".to_string(), self.x);
        obs.extra.insert("spider_z".to_string(), self.z);
        obs
    }

    fn distance_to_target(&self) -> f64 {
        (self.target.0 - self.z).hypot(self.target.1 - self.x)
    }
}

/// Shared handle on the simulated robot
#[derive(Debug, Clone)]
pub struct SimWorld {
    body: Arc<Mutex<Body>>,
    params: SimParams,
}

impl SimWorld {
    pub fn new(params: SimParams) -> Self {
        Self {
            body: Arc::new(Mutex::new(Body::start(params.target_distance))),
            params,
        }
    }

    /// Environment handle with its own noise stream
    pub fn environment(&self, stream: u64) -> SimEnvironment {
        SimEnvironment {
            world: self.clone(),
            rng: StdRng::seed_from_u64(self.params.seed.wrapping_add(stream)),
        }
    }

    pub fn targets_reached(&self) -> u64 {
        self.body.lock().map(|b| b.targets_reached).unwrap_or(0)
    }
}

pub struct SimEnvironment {
    world: SimWorld,
    rng: StdRng,
}

impl SimEnvironment {
    fn with_body<T>(&self, f: impl FnOnce(&mut Body) -> T) -> Result<T> {
        let mut body = self
            .world
            .body
            .lock()
            .map_err(|_| SpiderError::Environment("simulation state poisoned".to_string()))?;
        Ok(f(&mut body))
    }
}

impl Environment<Motion> for SimEnvironment {
    fn reset(&mut self) -> Result<Observation> {
        let target_distance = self.world.params.target_distance;
        self.with_body(|body| {
            *body = Body::start(target_distance);
            body.observe()
        })
    }

    fn step(&mut self, action: Motion) -> Result<Observation> {
        if !action.forward.is_finite() || !action.turn.is_finite() {
            return Err(SpiderError::Environment(format!("invalid motion {action:?}")));
        }

        let params = self.world.params;
        let noise = if action.forward > 0.0 && params.heading_noise > 0.0 {
            self.rng.gen_range(-params.heading_noise..=params.heading_noise)
        } else {
            0.0
        };
        let angle = self.rng.gen_range(0.0..std::f64::consts::TAU);

        self.with_body(|body| {
            body.yaw += action.turn + noise;
            let yaw = body.yaw.to_radians();
            body.z += action.forward * yaw.cos();
            body.x += action.forward * yaw.sin();

            if body.distance_to_target() < params.arrive_radius {
                body.targets_reached += 1;
                body.target = (
                    body.z + params.target_distance * angle.cos(),
                    body.x + params.target_distance * angle.sin(),
                );
                info!(
                    "Target {} reached, next at ({:.1}, {:.1})",
                    body.targets_reached, body.target.0, body.target.1
                );
            }

            body.observe()
        })
    }
}

/// Forward gait: follows the rule-based steering bands
pub struct GaitPolicy {
    pub stride: f64,
    pub arc_turn: f64,
    pub spin_turn: f64,
}

impl Default for GaitPolicy {
    fn default() -> Self {
        Self {
            stride: 1.0,
            arc_turn: 4.0,
            spin_turn: 10.0,
        }
    }
}

impl Policy<Motion> for GaitPolicy {
    fn name(&self) -> &str {
        "gait"
    }

    fn predict(&self, observation: &Observation) -> Result<Motion> {
        let motion = match SteeringAction::choose(observation.offset_angle)? {
            SteeringAction::Forward => Motion {
                forward: self.stride,
                turn: 0.0,
            },
            SteeringAction::LeftFront => Motion {
                forward: self.stride * 0.7,
                turn: self.arc_turn,
            },
            SteeringAction::RightFront => Motion {
                forward: self.stride * 0.7,
                turn: -self.arc_turn,
            },
            SteeringAction::CounterclockwiseRotation => Motion {
                forward: 0.0,
                turn: self.spin_turn,
            },
            SteeringAction::ClockwiseRotation => Motion {
                forward: 0.0,
                turn: -self.spin_turn,
            },
        };
        Ok(motion)
    }
}

/// Redirect: turn in place towards the target, at most `max_turn` per tick
pub struct SpinPolicy {
    pub max_turn: f64,
}

impl Default for SpinPolicy {
    fn default() -> Self {
        Self { max_turn: 15.0 }
    }
}

impl Policy<Motion> for SpinPolicy {
    fn name(&self) -> &str {
        "spin"
    }

    fn predict(&self, observation: &Observation) -> Result<Motion> {
        Ok(Motion {
            forward: 0.0,
            turn: observation.offset_angle.clamp(-self.max_turn, self.max_turn),
        })
    }
}
