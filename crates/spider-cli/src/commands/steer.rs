//! Rule-based steering command

use anyhow::Result;
use clap::Args;

use spider_core::SteeringAction;

#[derive(Args)]
pub struct SteerArgs {
    /// Heading error in degrees (positive: target to the left)
    #[arg(allow_negative_numbers = true)]
    pub angle: f64,
}

pub async fn run(args: SteerArgs) -> Result<()> {
    let action = SteeringAction::choose(args.angle)?;
    println!("{action}");
    Ok(())
}
