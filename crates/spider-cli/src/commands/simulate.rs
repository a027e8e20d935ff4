//! Inference loop against the kinematic simulator

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::{debug, info};

use spider_core::{Observation, PolicyKind, SpiderError};
use spider_rl::{Episode, InferenceLoop, LoopStats, PolicyBinding, PolicyRouter, RewardShaper};

use crate::config::Config;
use crate::sim::{GaitPolicy, SimParams, SimWorld, SpinPolicy};

/// Extra observation field carrying the forward coordinate
const FORWARD_POSITION: &str = "spider_z";

#[derive(Args)]
pub struct SimulateArgs {
    /// Stop after this many ticks (runs until Ctrl-C otherwise)
    #[arg(short, long)]
    pub ticks: Option<u64>,

    /// Seed for the heading noise
    #[arg(long, default_value_t = 7)]
    pub seed: u64,

    /// Heading noise per walking step, degrees
    #[arg(long, default_value_t = 6.0)]
    pub noise: f64,

    /// Distance at which new targets are placed
    #[arg(long, default_value_t = 70.0)]
    pub target_distance: f64,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct Summary {
    stats: LoopStats,
    forward_share: f64,
    redirect_share: f64,
    episodes: u64,
    targets_reached: u64,
    mean_reward: f64,
}

pub async fn run(args: SimulateArgs, config: &Config) -> Result<()> {
    let params = SimParams {
        heading_noise: args.noise,
        target_distance: args.target_distance,
        seed: args.seed,
        ..SimParams::default()
    };
    let world = SimWorld::new(params);

    let router = PolicyRouter::new(config.router)?;
    let shaper = RewardShaper::new(config.reward.clone())?;
    let mut episode = Episode::new(&config.reward, &config.control);

    let mut control = InferenceLoop::new(
        router,
        PolicyBinding::new(GaitPolicy::default(), world.environment(0)),
        PolicyBinding::new(SpinPolicy::default(), world.environment(1)),
        config.control.initial_policy,
    );

    let stop = Arc::new(AtomicBool::new(false));
    let signal_flag = Arc::clone(&stop);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, stopping");
            signal_flag.store(true, Ordering::Relaxed);
        }
    });

    let max_ticks = args.ticks;
    let loop_stop = Arc::clone(&stop);
    let (stats, episodes, mean_reward) = tokio::task::spawn_blocking(move || -> Result<_> {
        let mut total_reward = 0.0;
        let stats = control.run_with(max_ticks, &loop_stop, |_, observation| {
            total_reward += record_tick(&mut episode, &shaper, observation)?;
            Ok(())
        })?;

        let mean = if stats.total_ticks == 0 {
            0.0
        } else {
            total_reward / stats.total_ticks as f64
        };
        Ok((stats, episode.episodes_started(), mean))
    })
    .await
    .context("Simulation task panicked")??;

    let summary = Summary {
        stats,
        forward_share: stats.share(PolicyKind::Forward),
        redirect_share: stats.share(PolicyKind::Redirect),
        episodes,
        targets_reached: world.targets_reached(),
        mean_reward,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Simulation Summary");
        println!("==================\n");
        println!("Ticks:           {}", summary.stats.total_ticks);
        println!(
            "Forward ticks:   {} ({:.1}%)",
            summary.stats.forward_ticks,
            summary.forward_share * 100.0
        );
        println!(
            "Redirect ticks:  {} ({:.1}%)",
            summary.stats.redirect_ticks,
            summary.redirect_share * 100.0
        );
        println!("Switches:        {}", summary.stats.switches);
        println!("Episodes:        {}", summary.episodes);
        println!("Targets reached: {}", summary.targets_reached);
        println!("Mean reward:     {:.3}", summary.mean_reward);
    }

    Ok(())
}

/// Reward one tick and start a new episode once the current one is truncated
fn record_tick(
    episode: &mut Episode,
    shaper: &RewardShaper,
    observation: &Observation,
) -> spider_core::Result<f64> {
    let z = observation
        .extra(FORWARD_POSITION)
        .ok_or(SpiderError::MissingObservationField(FORWARD_POSITION))?;
    let reward = episode.step(shaper, observation, z)?;

    if episode.is_truncated() {
        debug!("Episode truncated at step {}", episode.steps());
        episode.reset();
    }
    Ok(reward)
}
