use serde::{Deserialize, Serialize};
use tracing::debug;

use super::collision::Rect;
use super::rng::RngProvider;
use crate::config::{ScreenSize, MIN_GAP_POSITION};

pub const OBSTACLE_WIDTH: i32 = 20;
/// Horizontal distance past the right edge where new obstacles appear.
pub const SPAWN_OFFSET: i32 = 20;
/// Leftward scroll per tick.
pub const SCROLL_SPEED: i32 = 18;

/// The single live pipe.
///
/// `gap` is drawn at respawn and is never touched in between. Policy A reads
/// it as the centre of the safe band, policy B as the pipe height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: i32,
    pub gap: i32,
    pub width: i32,
}

impl Obstacle {
    pub fn advance(&mut self) {
        self.x -= SCROLL_SPEED;
    }

    /// True once the pipe is at least two widths past the left edge.
    pub fn has_exited(&self) -> bool {
        self.x + 2 * self.width <= 0
    }

    /// Full-height column occupied by the pipe.
    pub fn column(&self, screen: ScreenSize) -> Rect {
        Rect::new(self.x, 0, self.width, screen.height)
    }
}

/// Draws fresh obstacles off the right edge of the screen.
#[derive(Debug, Clone, Copy)]
pub struct ObstacleGenerator {
    screen: ScreenSize,
}

impl ObstacleGenerator {
    pub fn new(screen: ScreenSize) -> Self {
        Self { screen }
    }

    /// Draw a new obstacle. Consumes exactly one value from `rng`.
    pub fn respawn(&self, rng: &mut RngProvider) -> Obstacle {
        let gap = rng.gen_range(MIN_GAP_POSITION, self.screen.max_gap_position());
        let obstacle = Obstacle {
            x: self.screen.width + SPAWN_OFFSET,
            gap,
            width: OBSTACLE_WIDTH,
        };
        debug!(gap, x = obstacle.x, "obstacle respawned");
        obstacle
    }

    /// Replace `obstacle` if it has left the screen. Returns whether it did.
    pub fn respawn_if_exited(&self, obstacle: &mut Obstacle, rng: &mut RngProvider) -> bool {
        if obstacle.has_exited() {
            *obstacle = self.respawn(rng);
            true
        } else {
            false
        }
    }
}
