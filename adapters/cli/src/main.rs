#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Star Warden session.

mod session;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use log::info;
use star_warden_core::{DirectorConfig, ViewportBounds, WorldPoint};
use star_warden_director::Director;

use crate::session::Script;

/// Runs a scripted Star Warden session and prints what the director did.
#[derive(Debug, Parser)]
#[command(name = "star-warden", version)]
struct CliArgs {
    /// TOML file overriding the default tuning.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed for the run; overrides the configured one.
    #[arg(long)]
    seed: Option<u64>,
    /// Stop once this wave begins.
    #[arg(long, default_value_t = 10)]
    waves: u32,
    /// Upper bound on simulated time, in seconds.
    #[arg(long, default_value_t = 1800)]
    max_secs: u64,
    /// Length of one simulated frame, in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// How long each enemy survives before the scripted player kills it.
    #[arg(long, default_value_t = 2500)]
    kill_delay_ms: u64,
    /// Hit the player on this interval; never when omitted.
    #[arg(long)]
    hit_every_ms: Option<u64>,
    /// Half-width of the simulated viewport in world units.
    #[arg(long, default_value_t = 8.0)]
    half_width: f32,
    /// Half-height of the simulated viewport in world units.
    #[arg(long, default_value_t = 4.5)]
    half_height: f32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let mut config = load_config(args.config.as_ref())?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate().context("invalid director configuration")?;

    let script = script_from(&args)?;
    info!(
        "running seed {:#x} until wave {} or {}s",
        config.seed,
        script.wave_target,
        script.time_limit.as_secs()
    );

    let mut director = Director::seeded(config);
    let summary = session::run(&mut director, &script);
    println!("{summary}");
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<DirectorConfig> {
    let Some(path) = path else {
        return Ok(DirectorConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
}

fn script_from(args: &CliArgs) -> Result<Script> {
    ensure!(args.frame_ms > 0, "--frame-ms must be positive");
    ensure!(
        args.half_width > 0.0 && args.half_height > 0.0,
        "viewport extents must be positive"
    );
    let hit_every = match args.hit_every_ms {
        Some(0) => anyhow::bail!("--hit-every-ms must be positive"),
        Some(ms) => Some(Duration::from_millis(ms)),
        None => None,
    };
    Ok(Script {
        frame: Duration::from_millis(args.frame_ms),
        kill_delay: Duration::from_millis(args.kill_delay_ms),
        hit_every,
        wave_target: args.waves,
        time_limit: Duration::from_secs(args.max_secs),
        viewport: ViewportBounds::new(
            WorldPoint::new(-args.half_width, -args.half_height),
            WorldPoint::new(args.half_width, args.half_height),
        ),
    })
}
