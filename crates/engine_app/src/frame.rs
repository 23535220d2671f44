//! Fixed-timestep frame loop.
//!
//! Each frame runs two phases in order:
//!
//! 1. Mutation: gameplay code edits local transforms and hierarchy. World
//!    transforms are recomputed as each edit lands.
//! 2. Finalize: changed world transforms are published once to every
//!    receiver and the change set is cleared.

use std::time::Instant;

use engine_core::Result;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::demo::DemoScene;
use crate::world::World;

#[derive(Debug)]
pub struct FrameLoop {
    frame_id: u64,
    /// Simulated seconds since the first frame.
    elapsed: f64,
    config: AppConfig,
    world: World,
    demo: DemoScene,
}

impl FrameLoop {
    /// Create a frame loop over a freshly built demo scene.
    pub fn new(config: AppConfig) -> Result<Self> {
        let mut world = World::new();
        let demo = DemoScene::build(&mut world, &config)?;
        Ok(Self {
            frame_id: 0,
            elapsed: 0.0,
            config,
            world,
            demo,
        })
    }

    #[must_use]
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Run one frame. Returns the number of entities whose transforms were
    /// published.
    pub fn tick(&mut self, dt: f64) -> Result<usize> {
        self.frame_id += 1;
        self.elapsed += dt;

        self.demo.update(&mut self.world, self.frame_id, self.elapsed)?;
        let published = self.world.finalize_frame();

        debug!(frame_id = self.frame_id, dt, published, "frame finalized");
        if self.config.log_interval > 0 && self.frame_id % self.config.log_interval == 0 {
            info!(
                frame_id = self.frame_id,
                published,
                entities = self.world.entities.len(),
                scene_objects = self.world.scene.len(),
                "fan-out summary"
            );
        }
        Ok(published)
    }

    /// Run the loop for the configured number of frames, or indefinitely.
    pub fn run(&mut self) -> Result<()> {
        let frame_duration = self.config.frame_duration();
        let mut frame_count = 0u64;

        info!(
            frame_rate = self.config.frame_rate,
            max_frames = self.config.max_frames,
            "starting frame loop"
        );

        loop {
            let start = Instant::now();

            self.tick(frame_duration.as_secs_f64())?;

            frame_count += 1;
            if self.config.max_frames > 0 && frame_count >= self.config.max_frames {
                info!(frames = frame_count, "frame loop complete");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            } else {
                warn!(
                    frame_id = self.frame_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = frame_duration.as_millis() as u64,
                    "frame exceeded time budget"
                );
            }
        }
        Ok(())
    }
}
