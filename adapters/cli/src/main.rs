#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless item drop session.

mod config;
mod sim;

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Replays a fixed-step item drop session and prints what happened.
#[derive(Debug, Parser)]
#[command(name = "item-drop", version)]
struct Cli {
    /// Drop configuration TOML file. The built-in catalog is used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the weighted selection and slot picking.
    #[arg(long, default_value_t = 0x1d_2024)]
    seed: u64,
    /// Simulated session length in seconds.
    #[arg(long, default_value_t = 300.0)]
    duration_secs: f32,
    /// Length of a single simulated frame in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Score the simulated player earns per second.
    #[arg(long, default_value_t = 40)]
    score_per_second: i64,
    /// Number of slots on each side of the field.
    #[arg(long, default_value_t = 6)]
    slots: u32,
    /// Number of pre-built item entities.
    #[arg(long, default_value_t = 8)]
    pool_size: usize,
    /// Seconds a dropped item stays on the field before the player picks it up.
    #[arg(long, default_value_t = 20.0)]
    item_lifetime_secs: f32,
}

impl Cli {
    fn settings(&self) -> Result<sim::Settings> {
        ensure!(self.frame_ms > 0, "--frame-ms must be positive");
        let duration = Duration::try_from_secs_f32(self.duration_secs)?;
        let item_lifetime = Duration::try_from_secs_f32(self.item_lifetime_secs)?;
        Ok(sim::Settings {
            seed: self.seed,
            duration,
            frame: Duration::from_millis(self.frame_ms),
            score_per_second: self.score_per_second,
            slots_per_side: self.slots,
            pool_size: self.pool_size,
            item_lifetime,
        })
    }
}

/// Entry point for the item drop command-line interface.
fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let settings = cli.settings()?;
    let drop_config = config::load(cli.config.as_deref())?;
    let summary = sim::run(drop_config, &settings)?;
    print!("{summary}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
