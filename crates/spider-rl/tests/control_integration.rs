//! Integration tests for the inference loop
//!
//! A small turning model stands in for the simulator: the redirect policy
//! cancels heading error, the forward policy walks and slowly drifts off
//! heading.

#![allow(clippy::float_cmp)]

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use spider_core::{Observation, PolicyKind, Result, SpiderError};
use spider_rl::{
    Environment, InferenceLoop, Policy, PolicyBinding, PolicyRouter, RouterThresholds,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Walk,
    Turn(f64),
}

/// Robot body both environments act on, as two simulator wrappers around
/// the same robot would
#[derive(Debug)]
struct Body {
    heading_error: f64,
    distance: f64,
    drift_per_step: f64,
}

/// Heading error evolves with each command; distance shrinks when walking
struct TurningModel {
    body: Arc<Mutex<Body>>,
}

impl Environment<Command> for TurningModel {
    fn reset(&mut self) -> Result<Observation> {
        Ok(self.observe())
    }

    fn step(&mut self, action: Command) -> Result<Observation> {
        {
            let mut body = self.body.lock().unwrap();
            match action {
                Command::Walk => {
                    body.distance = (body.distance - 1.0).max(0.0);
                    body.heading_error += body.drift_per_step;
                }
                Command::Turn(degrees) => body.heading_error -= degrees,
            }
        }
        Ok(self.observe())
    }
}

impl TurningModel {
    fn observe(&self) -> Observation {
        let body = self.body.lock().unwrap();
        Observation::new(0.0, body.distance, body.heading_error)
    }
}

/// Forward and redirect environments sharing one body
fn shared_models(heading_error: f64) -> (TurningModel, TurningModel) {
    let body = Arc::new(Mutex::new(Body {
        heading_error,
        distance: 70.0,
        drift_per_step: 4.0,
    }));
    (
        TurningModel { body: body.clone() },
        TurningModel { body },
    )
}

struct Walker;

impl Policy<Command> for Walker {
    fn name(&self) -> &str {
        "walker"
    }

    fn predict(&self, _observation: &Observation) -> Result<Command> {
        Ok(Command::Walk)
    }
}

struct Turner {
    max_turn: f64,
}

impl Policy<Command> for Turner {
    fn name(&self) -> &str {
        "turner"
    }

    fn predict(&self, observation: &Observation) -> Result<Command> {
        let turn = observation.offset_angle.clamp(-self.max_turn, self.max_turn);
        Ok(Command::Turn(turn))
    }
}

struct FailingPolicy;

impl Policy<Command> for FailingPolicy {
    fn name(&self) -> &str {
        "failing"
    }

    fn predict(&self, _observation: &Observation) -> Result<Command> {
        Err(SpiderError::Policy("model not loaded".to_string()))
    }
}

fn router() -> PolicyRouter {
    PolicyRouter::new(RouterThresholds::new(45.0, 30.0)).unwrap()
}

#[test]
fn test_large_initial_error_is_redirected_then_walks() {
    let (forward_env, redirect_env) = shared_models(90.0);
    let mut control = InferenceLoop::new(
        router(),
        PolicyBinding::new(Walker, forward_env),
        PolicyBinding::new(Turner { max_turn: 20.0 }, redirect_env),
        PolicyKind::Forward,
    );
    control.start().unwrap();

    // Forward reads 90 degrees and hands over immediately
    assert_eq!(control.tick().unwrap(), PolicyKind::Redirect);

    let mut used = vec![PolicyKind::Redirect];
    for _ in 0..10 {
        used.push(control.tick().unwrap());
    }

    // Routed on 90, 70, 50, then 30 reaches to_forward
    assert_eq!(
        &used[..3],
        &[PolicyKind::Redirect, PolicyKind::Redirect, PolicyKind::Redirect]
    );
    assert_eq!(used[3], PolicyKind::Forward);
    // Drift carries it back past to_redirect: 34, 38, 42, 46
    assert_eq!(used[7], PolicyKind::Redirect);
    assert!(control.stats().switches >= 3);
}

#[test]
fn test_hysteresis_limits_switching_under_drift() {
    let (forward_env, redirect_env) = shared_models(0.0);
    let mut control = InferenceLoop::new(
        router(),
        PolicyBinding::new(Walker, forward_env),
        PolicyBinding::new(Turner { max_turn: 5.0 }, redirect_env),
        PolicyKind::Forward,
    );

    let stop = AtomicBool::new(false);
    let stats = control.run(Some(200), &stop).unwrap();

    assert_eq!(stats.total_ticks, 200);
    assert_eq!(stats.forward_ticks + stats.redirect_ticks, 200);
    // Never toggles on consecutive ticks
    assert!(stats.switches < 100);
}

#[test]
fn test_policy_error_stops_the_loop() {
    let (forward_env, redirect_env) = shared_models(0.0);
    let mut control = InferenceLoop::new(
        router(),
        PolicyBinding::new(FailingPolicy, forward_env),
        PolicyBinding::new(Turner { max_turn: 5.0 }, redirect_env),
        PolicyKind::Forward,
    );

    let stop = AtomicBool::new(false);
    let err = control.run(Some(10), &stop).unwrap_err();

    assert!(matches!(err, SpiderError::Policy(_)));
    assert_eq!(control.stats().total_ticks, 0);
}

#[test]
fn test_initial_redirect_policy() {
    let (forward_env, redirect_env) = shared_models(10.0);
    let mut control = InferenceLoop::new(
        router(),
        PolicyBinding::new(Walker, forward_env),
        PolicyBinding::new(Turner { max_turn: 5.0 }, redirect_env),
        PolicyKind::Redirect,
    );
    control.start().unwrap();

    assert_eq!(control.current_policy(), PolicyKind::Redirect);
    // 10 degrees is inside to_forward, so the first tick already walks
    assert_eq!(control.tick().unwrap(), PolicyKind::Forward);
}
