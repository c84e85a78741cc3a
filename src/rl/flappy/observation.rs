use serde::{Deserialize, Serialize};

use super::collision::CollisionPolicy;
use super::engine::Agent;
use super::obstacle::{Obstacle, OBSTACLE_WIDTH, SCROLL_SPEED, SPAWN_OFFSET};
use crate::config::{ScreenSize, MIN_GAP_POSITION};
use crate::rl::State;

/// Three pixel-valued features; ordering depends on the collision policy.
///
/// | policy        | 0       | 1            | 2            |
/// |---------------|---------|--------------|--------------|
/// | safe gap      | agent y | obstacle x   | gap position |
/// | height cutoff | agent y | gap height   | obstacle x   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlappyObservation(pub [i32; 3]);

impl FlappyObservation {
    pub fn values(&self) -> &[i32; 3] {
        &self.0
    }
}

impl State for FlappyObservation {
    fn to_features(&self) -> Vec<f64> {
        self.0.iter().map(|&v| v as f64).collect()
    }
}

/// Nominal bounds and labels for each observation slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationSpace {
    pub low: [i32; 3],
    pub high: [i32; 3],
    pub labels: [String; 3],
}

impl ObservationSpace {
    pub fn contains(&self, observation: &FlappyObservation) -> bool {
        observation
            .0
            .iter()
            .zip(self.low.iter().zip(self.high.iter()))
            .all(|(v, (lo, hi))| lo <= v && v <= hi)
    }
}

/// Projects agent and obstacle state into a [`FlappyObservation`].
#[derive(Debug, Clone, Copy)]
pub struct ObservationEmitter {
    policy: CollisionPolicy,
    screen: ScreenSize,
}

impl ObservationEmitter {
    pub fn new(policy: CollisionPolicy, screen: ScreenSize) -> Self {
        Self { policy, screen }
    }

    pub fn emit(&self, agent: &Agent, obstacle: &Obstacle) -> FlappyObservation {
        match self.policy {
            CollisionPolicy::SafeGap { .. } => FlappyObservation([agent.y, obstacle.x, obstacle.gap]),
            CollisionPolicy::HeightCutoff => FlappyObservation([agent.y, obstacle.gap, obstacle.x]),
        }
    }

    pub fn space(&self) -> ObservationSpace {
        let ScreenSize { width, height } = self.screen;
        // The column keeps scrolling until x + 2w <= 0, and the observation is
        // taken before the respawn, so x dips below zero on the last ticks.
        let x = (-(2 * OBSTACLE_WIDTH + SCROLL_SPEED), width + SPAWN_OFFSET, "obstacle_x");
        let gap_label = match self.policy {
            CollisionPolicy::SafeGap { .. } => "gap_position",
            CollisionPolicy::HeightCutoff => "gap_height",
        };
        let gap = (MIN_GAP_POSITION, self.screen.max_gap_position(), gap_label);
        let y = (0, height, "agent_y");

        let slots = match self.policy {
            CollisionPolicy::SafeGap { .. } => [y, x, gap],
            CollisionPolicy::HeightCutoff => [y, gap, x],
        };
        ObservationSpace {
            low: slots.map(|s| s.0),
            high: slots.map(|s| s.1),
            labels: slots.map(|s| s.2.to_string()),
        }
    }
}
