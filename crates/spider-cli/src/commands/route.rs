//! Routing replay command

use anyhow::Result;
use clap::Args;

use spider_core::PolicyKind;
use spider_rl::PolicyRouter;

use crate::config::Config;

#[derive(Args)]
pub struct RouteArgs {
    /// Heading errors in degrees, one per tick
    #[arg(required = true, allow_negative_numbers = true)]
    pub angles: Vec<f64>,

    /// Policy active before the first tick (forward or redirect)
    #[arg(short, long)]
    pub start: Option<PolicyKind>,

    /// Override router.to_redirect
    #[arg(long)]
    pub to_redirect: Option<f64>,

    /// Override router.to_forward
    #[arg(long)]
    pub to_forward: Option<f64>,
}

pub async fn run(args: RouteArgs, config: &Config) -> Result<()> {
    let mut thresholds = config.router;
    if let Some(value) = args.to_redirect {
        thresholds.to_redirect = value;
    }
    if let Some(value) = args.to_forward {
        thresholds.to_forward = value;
    }

    let router = PolicyRouter::new(thresholds)?;
    let start = args.start.unwrap_or(config.control.initial_policy);
    let states = router.replay(&args.angles, start)?;

    println!(
        "to_redirect = {}, to_forward = {}, start = {}",
        thresholds.to_redirect, thresholds.to_forward, start
    );
    println!("{:>6}  {:>10}  policy", "tick", "angle");

    let mut previous = start;
    for (tick, (angle, state)) in args.angles.iter().zip(&states).enumerate() {
        let marker = if *state != previous { "  *" } else { "" };
        println!("{tick:>6}  {angle:>10.2}  {state}{marker}");
        previous = *state;
    }

    Ok(())
}
