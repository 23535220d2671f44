//! # engine_app
//!
//! Runs the frame loop over a generated scene hierarchy: spinning nodes are
//! edited every frame, world transforms propagate through the scene graph,
//! and the changes fan out to render objects, cameras and lights.
//!
//! ## Configuration
//!
//! Defaults come from [`config::AppConfig`], then `ENGINE_FRAME_RATE` /
//! `ENGINE_MAX_FRAMES`, then command-line flags. `RUST_LOG` controls log
//! output.

mod config;
mod demo;
mod frame;
mod world;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use frame::FrameLoop;

#[derive(Parser)]
#[command(name = "engine_app", about = "Scene graph frame loop over a generated hierarchy")]
struct Args {
    /// Target frames per second
    #[arg(short, long)]
    frame_rate: Option<f64>,

    /// Stop after this many frames (0 = run forever)
    #[arg(short, long)]
    max_frames: Option<u64>,

    /// Number of entities in the generated hierarchy
    #[arg(short, long)]
    entities: Option<usize>,

    /// Children per node in the generated hierarchy
    #[arg(short, long)]
    branching: Option<usize>,

    /// Log a fan-out summary every N frames (0 = never)
    #[arg(long)]
    log_interval: Option<u64>,
}

impl Args {
    fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(frame_rate) = self.frame_rate {
            config = config.with_frame_rate(frame_rate);
        }
        if let Some(max_frames) = self.max_frames {
            config = config.with_max_frames(max_frames);
        }
        if let Some(entities) = self.entities {
            config = config.with_entity_count(entities);
        }
        if let Some(branching) = self.branching {
            config = config.with_branching(branching);
        }
        if let Some(log_interval) = self.log_interval {
            config = config.with_log_interval(log_interval);
        }
        config
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "engine_app=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = args.apply(AppConfig::from_env()?);
    config.validate()?;

    info!(
        frame_rate = config.frame_rate,
        max_frames = config.max_frames,
        entities = config.entity_count,
        branching = config.branching,
        "engine starting"
    );

    let mut frame_loop = FrameLoop::new(config)?;
    frame_loop.run()?;

    info!(
        frames = frame_loop.frame_id(),
        entities = frame_loop.world().entities.len(),
        "engine shut down"
    );
    Ok(())
}
