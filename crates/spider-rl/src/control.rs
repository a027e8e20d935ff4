//! Inference control loop - coordinates routing, policies and environments
//!
//! Each tick is strictly sequential: read the heading error from the
//! current observation, route, ask the selected policy for an action, step
//! the matching environment and keep its observation for the next tick.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{debug, info};

use spider_core::{Observation, PolicyKind, Result, SpiderError};

use crate::router::PolicyRouter;

/// A trained decision function; the action type is opaque to the loop
pub trait Policy<A>: Send {
    /// Policy name, for logs
    fn name(&self) -> &str;

    /// Action for the given observation
    fn predict(&self, observation: &Observation) -> Result<A>;
}

/// A simulated or real environment driven by one policy
pub trait Environment<A>: Send {
    /// Reset and return the initial observation
    fn reset(&mut self) -> Result<Observation>;

    /// Apply an action and return the next observation
    fn step(&mut self, action: A) -> Result<Observation>;
}

/// A policy together with the environment its actions are sent to
pub struct PolicyBinding<A> {
    pub policy: Box<dyn Policy<A>>,
    pub environment: Box<dyn Environment<A>>,
}

impl<A> PolicyBinding<A> {
    pub fn new(
        policy: impl Policy<A> + 'static,
        environment: impl Environment<A> + 'static,
    ) -> Self {
        Self {
            policy: Box::new(policy),
            environment: Box::new(environment),
        }
    }
}

/// Counters over the lifetime of a loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoopStats {
    pub total_ticks: u64,
    pub forward_ticks: u64,
    pub redirect_ticks: u64,
    pub switches: u64,
}

impl LoopStats {
    fn record(&mut self, policy: PolicyKind, switched: bool) {
        self.total_ticks += 1;
        match policy {
            PolicyKind::Forward => self.forward_ticks += 1,
            PolicyKind::Redirect => self.redirect_ticks += 1,
        }
        if switched {
            self.switches += 1;
        }
    }

    /// Share of ticks spent in `policy`
    pub fn share(&self, policy: PolicyKind) -> f64 {
        if self.total_ticks == 0 {
            return 0.0;
        }
        let ticks = match policy {
            PolicyKind::Forward => self.forward_ticks,
            PolicyKind::Redirect => self.redirect_ticks,
        };
        ticks as f64 / self.total_ticks as f64
    }
}

/// Inference loop switching between the forward and redirect policies
pub struct InferenceLoop<A> {
    router: PolicyRouter,
    forward: PolicyBinding<A>,
    redirect: PolicyBinding<A>,
    initial_policy: PolicyKind,
    current: PolicyKind,
    observation: Option<Observation>,
    stats: LoopStats,
}

impl<A> InferenceLoop<A> {
    pub fn new(
        router: PolicyRouter,
        forward: PolicyBinding<A>,
        redirect: PolicyBinding<A>,
        initial_policy: PolicyKind,
    ) -> Self {
        Self {
            router,
            forward,
            redirect,
            initial_policy,
            current: initial_policy,
            observation: None,
            stats: LoopStats::default(),
        }
    }

    /// Reset both environments and take the first observation from the
    /// environment of the initial policy
    pub fn start(&mut self) -> Result<()> {
        let forward_obs = self.forward.environment.reset()?;
        let redirect_obs = self.redirect.environment.reset()?;

        self.current = self.initial_policy;
        self.observation = Some(match self.initial_policy {
            PolicyKind::Forward => forward_obs,
            PolicyKind::Redirect => redirect_obs,
        });
        self.stats = LoopStats::default();

        info!(
            "Inference loop started with {} policy ({} / {})",
            self.current,
            self.forward.policy.name(),
            self.redirect.policy.name()
        );
        Ok(())
    }

    /// Run one observe → route → act → step cycle, returning the policy used
    pub fn tick(&mut self) -> Result<PolicyKind> {
        if self.observation.is_none() {
            self.start()?;
        }
        let observation = self.observation.as_ref().ok_or_else(|| {
            SpiderError::Environment("no observation after reset".to_string())
        })?;

        let next = self.router.decide(observation.offset_angle, self.current)?;
        let switched = next != self.current;
        if switched {
            info!(
                "Switching policy {} -> {} at heading error {:.2}",
                self.current, next, observation.offset_angle
            );
        }

        let binding = match next {
            PolicyKind::Forward => &mut self.forward,
            PolicyKind::Redirect => &mut self.redirect,
        };
        let action = binding.policy.predict(observation)?;
        let next_observation = binding.environment.step(action)?;

        self.current = next;
        self.observation = Some(next_observation);
        self.stats.record(next, switched);

        Ok(next)
    }

    /// Tick until `max_ticks` is reached (if any), `stop` is raised, or a
    /// tick fails
    pub fn run(&mut self, max_ticks: Option<u64>, stop: &AtomicBool) -> Result<LoopStats> {
        self.run_with(max_ticks, stop, |_, _| Ok(()))
    }

    /// Like [`run`](Self::run), calling `on_tick` after every tick with the
    /// policy used and the observation it produced. An error from `on_tick`
    /// stops the loop.
    pub fn run_with<F>(
        &mut self,
        max_ticks: Option<u64>,
        stop: &AtomicBool,
        mut on_tick: F,
    ) -> Result<LoopStats>
    where
        F: FnMut(PolicyKind, &Observation) -> Result<()>,
    {
        if self.observation.is_none() {
            self.start()?;
        }

        let mut ticks = 0u64;
        while max_ticks.map_or(true, |limit| ticks < limit) {
            if stop.load(Ordering::Relaxed) {
                info!("Stop requested after {} ticks", ticks);
                break;
            }
            let policy = self.tick()?;
            ticks += 1;

            let observation = self.observation.as_ref().ok_or_else(|| {
                SpiderError::Environment("no observation after step".to_string())
            })?;
            on_tick(policy, observation)?;
        }

        debug!("Loop finished: {:?}", self.stats);
        Ok(self.stats)
    }

    pub fn current_policy(&self) -> PolicyKind {
        self.current
    }

    /// Observation the next tick will route on
    pub fn observation(&self) -> Option<&Observation> {
        self.observation.as_ref()
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn router(&self) -> &PolicyRouter {
        &self.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays a fixed script of heading errors
    struct ScriptedEnv {
        angles: VecDeque<f64>,
        received: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Environment<&'static str> for ScriptedEnv {
        fn reset(&mut self) -> Result<Observation> {
            Ok(Observation::new(0.0, 70.0, 0.0))
        }

        fn step(&mut self, action: &'static str) -> Result<Observation> {
            self.received.lock().unwrap().push(action);
            let angle = self
                .angles
                .pop_front()
                .ok_or_else(|| SpiderError::Environment("script exhausted".to_string()))?;
            Ok(Observation::new(0.0, 70.0, angle))
        }
    }

    struct ConstPolicy(&'static str);

    impl Policy<&'static str> for ConstPolicy {
        fn name(&self) -> &str {
            self.0
        }

        fn predict(&self, _observation: &Observation) -> Result<&'static str> {
            Ok(self.0)
        }
    }

    /// Both environments share one script so the angle sequence is global
    fn build(angles: &[f64]) -> (InferenceLoop<&'static str>, Arc<Mutex<Vec<&'static str>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let script: VecDeque<f64> = angles.iter().copied().collect();

        let shared = Arc::new(Mutex::new(script));
        struct SharedEnv(Arc<Mutex<VecDeque<f64>>>, Arc<Mutex<Vec<&'static str>>>);
        impl Environment<&'static str> for SharedEnv {
            fn reset(&mut self) -> Result<Observation> {
                Ok(Observation::new(0.0, 70.0, 0.0))
            }
            fn step(&mut self, action: &'static str) -> Result<Observation> {
                self.1.lock().unwrap().push(action);
                let angle = self.0.lock().unwrap().pop_front().unwrap_or(0.0);
                Ok(Observation::new(0.0, 70.0, angle))
            }
        }

        let control = InferenceLoop::new(
            PolicyRouter::default(),
            PolicyBinding::new(ConstPolicy("fwd"), SharedEnv(shared.clone(), received.clone())),
            PolicyBinding::new(ConstPolicy("rdr"), SharedEnv(shared, received.clone())),
            PolicyKind::Forward,
        );
        (control, received)
    }

    #[test]
    fn test_tick_routes_by_heading_error() {
        // First tick routes on the reset observation (angle 0)
        let (mut control, received) = build(&[50.0, 35.0, 25.0, 10.0]);
        control.start().unwrap();

        let used: Vec<_> = (0..5).map(|_| control.tick().unwrap()).collect();

        assert_eq!(
            used,
            vec![
                PolicyKind::Forward,
                PolicyKind::Redirect,
                PolicyKind::Redirect,
                PolicyKind::Forward,
                PolicyKind::Forward,
            ]
        );
        assert_eq!(
            *received.lock().unwrap(),
            vec!["fwd", "rdr", "rdr", "fwd", "fwd"]
        );

        let stats = control.stats();
        assert_eq!(stats.total_ticks, 5);
        assert_eq!(stats.forward_ticks, 3);
        assert_eq!(stats.redirect_ticks, 2);
        assert_eq!(stats.switches, 2);
        assert!((stats.share(PolicyKind::Redirect) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_run_respects_tick_limit() {
        let (mut control, _) = build(&[]);
        let stop = AtomicBool::new(false);

        let stats = control.run(Some(7), &stop).unwrap();
        assert_eq!(stats.total_ticks, 7);
    }

    #[test]
    fn test_run_honours_stop_flag() {
        let (mut control, _) = build(&[]);
        let stop = AtomicBool::new(true);

        let stats = control.run(None, &stop).unwrap();
        assert_eq!(stats.total_ticks, 0);
    }

    #[test]
    fn test_run_with_sees_every_tick() {
        let (mut control, _) = build(&[50.0, 20.0]);
        let stop = AtomicBool::new(false);

        let mut seen = Vec::new();
        let stats = control
            .run_with(Some(3), &stop, |policy, obs| {
                seen.push((policy, obs.offset_angle));
                Ok(())
            })
            .unwrap();

        assert_eq!(stats.total_ticks, 3);
        assert_eq!(
            seen,
            vec![
                (PolicyKind::Forward, 50.0),
                (PolicyKind::Redirect, 20.0),
                (PolicyKind::Forward, 0.0),
            ]
        );
    }

    #[test]
    fn test_run_with_callback_error_stops_loop() {
        let (mut control, _) = build(&[]);
        let stop = AtomicBool::new(false);

        let err = control
            .run_with(Some(10), &stop, |_, _| {
                Err(SpiderError::MissingObservationField("spider_z"))
            })
            .unwrap_err();

        assert!(matches!(err, SpiderError::MissingObservationField("spider_z")));
        assert_eq!(control.stats().total_ticks, 1);
    }

    #[test]
    fn test_environment_error_propagates() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let mut control = InferenceLoop::new(
            PolicyRouter::default(),
            PolicyBinding::new(
                ConstPolicy("fwd"),
                ScriptedEnv {
                    angles: VecDeque::from([5.0]),
                    received: received.clone(),
                },
            ),
            PolicyBinding::new(
                ConstPolicy("rdr"),
                ScriptedEnv {
                    angles: VecDeque::new(),
                    received,
                },
            ),
            PolicyKind::Forward,
        );

        let stop = AtomicBool::new(false);
        let err = control.run(Some(5), &stop).unwrap_err();
        assert!(matches!(err, SpiderError::Environment(_)));
        assert_eq!(control.stats().total_ticks, 1);
    }

    #[test]
    fn test_invalid_angle_keeps_observation() {
        let (mut control, _) = build(&[f64::NAN]);
        control.start().unwrap();
        control.tick().unwrap();

        assert!(matches!(control.tick(), Err(SpiderError::InvalidAngle(_))));
        assert!(control.observation().is_some());
    }

    #[test]
    fn test_empty_stats_share() {
        assert_eq!(LoopStats::default().share(PolicyKind::Forward), 0.0);
    }
}
