use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Error;
use crate::rl::flappy::CollisionPolicy;
use crate::Result;

/// Lowest gap position a respawn may draw.
pub const MIN_GAP_POSITION: i32 = 50;
/// Gap positions stay this far below the top of the screen.
pub const GAP_TOP_MARGIN: i32 = 60;
/// Largest accepted width or height, in pixels.
pub const MAX_SCREEN_DIMENSION: i32 = 16_384;

/// Screen dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

impl ScreenSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Exclusive upper bound for gap positions drawn at respawn.
    pub fn max_gap_position(&self) -> i32 {
        self.height - GAP_TOP_MARGIN
    }
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self::new(400, 400)
    }
}

/// Configuration for a Flappy Bird environment instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlappyConfig {
    /// Screen dimensions
    pub screen: ScreenSize,

    /// Collision and reward policy, fixed for the lifetime of the environment
    pub policy: CollisionPolicy,

    /// Episode length cap applied by `TimeLimit`; the core never enforces it
    pub max_episode_steps: usize,

    /// Seed used at construction; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for FlappyConfig {
    fn default() -> Self {
        Self {
            screen: ScreenSize::default(),
            policy: CollisionPolicy::default(),
            max_episode_steps: 400,
            seed: None,
        }
    }
}

impl FlappyConfig {
    pub fn with_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_screen(mut self, width: i32, height: i32) -> Self {
        self.screen = ScreenSize::new(width, height);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that the configuration describes a playable world
    pub fn validate(&self) -> Result<()> {
        let ScreenSize { width, height } = self.screen;
        if width <= 0 || height <= 0 {
            return Err(Error::config(format!(
                "screen size must be positive, got {}x{}",
                width, height
            )));
        }
        if width > MAX_SCREEN_DIMENSION || height > MAX_SCREEN_DIMENSION {
            return Err(Error::config(format!(
                "screen size {}x{} exceeds the {} pixel limit",
                width, height, MAX_SCREEN_DIMENSION
            )));
        }
        if self.screen.max_gap_position() <= MIN_GAP_POSITION {
            return Err(Error::config(format!(
                "screen height {} leaves no room for a gap in [{}, {})",
                height,
                MIN_GAP_POSITION,
                self.screen.max_gap_position()
            )));
        }
        if let CollisionPolicy::SafeGap { gap_height } = self.policy {
            if gap_height <= 0 {
                return Err(Error::config(format!(
                    "gap height must be positive, got {}",
                    gap_height
                )));
            }
        }
        if self.max_episode_steps == 0 {
            return Err(Error::config("max_episode_steps must be at least 1"));
        }
        Ok(())
    }

    /// Save the configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config: FlappyConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}
