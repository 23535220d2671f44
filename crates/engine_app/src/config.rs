//! Application configuration.

use std::time::Duration;

use anyhow::{Context, Result, ensure};

/// Environment variable overriding [`AppConfig::frame_rate`].
pub const FRAME_RATE_ENV: &str = "ENGINE_FRAME_RATE";
/// Environment variable overriding [`AppConfig::max_frames`].
pub const MAX_FRAMES_ENV: &str = "ENGINE_MAX_FRAMES";

/// Configuration for the frame loop and the generated demo scene.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Target frames per second.
    pub frame_rate: f64,
    /// Maximum number of frames to run (0 = unlimited).
    pub max_frames: u64,
    /// Number of entities in the demo hierarchy.
    pub entity_count: usize,
    /// Children per node in the demo hierarchy.
    pub branching: usize,
    /// Log a fan-out summary every this many frames (0 = never).
    pub log_interval: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            max_frames: 0,
            entity_count: 64,
            branching: 4,
            log_interval: 60,
        }
    }
}

impl AppConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`, keyed by the `*_ENV` names.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(raw) = lookup(FRAME_RATE_ENV) {
            self.frame_rate = raw
                .trim()
                .parse()
                .with_context(|| format!("{FRAME_RATE_ENV}={raw:?} is not a number"))?;
        }
        if let Some(raw) = lookup(MAX_FRAMES_ENV) {
            self.max_frames = raw
                .trim()
                .parse()
                .with_context(|| format!("{MAX_FRAMES_ENV}={raw:?} is not a frame count"))?;
        }
        Ok(self)
    }

    #[must_use]
    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    #[must_use]
    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = max_frames;
        self
    }

    #[must_use]
    pub fn with_entity_count(mut self, entity_count: usize) -> Self {
        self.entity_count = entity_count;
        self
    }

    #[must_use]
    pub fn with_branching(mut self, branching: usize) -> Self {
        self.branching = branching;
        self
    }

    #[must_use]
    pub fn with_log_interval(mut self, log_interval: u64) -> Self {
        self.log_interval = log_interval;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.frame_rate.is_finite() && self.frame_rate > 0.0,
            "frame rate must be positive, got {}",
            self.frame_rate
        );
        ensure!(self.branching > 0, "branching must be at least 1");
        Ok(())
    }

    /// Time budget of one frame.
    #[must_use]
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate)
    }
}
