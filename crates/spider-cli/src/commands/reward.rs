//! Reward evaluation command

use std::io::Read;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::warn;

use spider_core::{Observation, RewardMode};
use spider_rl::{no_target_reward, PreZQueue, RewardShaper};

use crate::config::Config;

#[derive(Args)]
pub struct RewardArgs {
    /// Observation as a JSON object, `@file.json`, or `-` for stdin
    pub observation: String,

    /// Ticks elapsed in the episode
    #[arg(short, long, default_value_t = 0)]
    pub step: u64,

    /// Print every reward term as JSON
    #[arg(short, long)]
    pub breakdown: bool,

    /// Robot position `x,z` for the NO_TARGET_MODE formula
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub position: Option<Vec<f64>>,

    /// Previous z values, oldest first (defaults to z_init_value)
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub history: Option<Vec<f64>>,
}

pub async fn run(args: RewardArgs, config: &Config) -> Result<()> {
    let observation = read_observation(&args.observation)?;
    let shaper = RewardShaper::new(config.reward.clone())?;

    let reward_config = shaper.config();
    let mut pre_z = match &args.history {
        Some(values) => {
            let mut queue = PreZQueue::new(reward_config.pre_z_queue_size);
            for &z in values {
                queue.push(z);
            }
            queue
        }
        None => PreZQueue::filled(reward_config.pre_z_queue_size, reward_config.z_init_value),
    };

    if let Some(position) = &args.position {
        if shaper.mode() != RewardMode::NoTargetMode {
            bail!("--position only applies to NO_TARGET_MODE");
        }
        let [x, z] = position.as_slice() else {
            bail!("--position expects exactly two values: x,z");
        };
        warn!("NO_TARGET_MODE formula is provisional");
        let reward = no_target_reward(*x, *z, &mut pre_z, reward_config)?;
        println!("{reward}");
        return Ok(());
    }

    if args.breakdown {
        let parts = shaper.breakdown(&observation, &mut pre_z, args.step)?;
        println!("{}", serde_json::to_string_pretty(&parts)?);
    } else {
        let reward = shaper.compute(&observation, &mut pre_z, args.step)?;
        println!("{reward}");
    }

    Ok(())
}

fn read_observation(source: &str) -> Result<Observation> {
    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read observation from stdin")?;
        buf
    } else if let Some(path) = source.strip_prefix('@') {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?
    } else {
        source.to_string()
    };

    Observation::from_json_str(&text).context("Invalid observation")
}
