use serde::{Deserialize, Serialize};

use super::obstacle::Obstacle;
use crate::config::ScreenSize;

pub const DEFAULT_GAP_HEIGHT: i32 = 100;

/// Axis-aligned rectangle anchored at its lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn overlaps_horizontally(&self, other: &Rect) -> bool {
        self.x < other.x + other.width && self.x + self.width > other.x
    }

    pub fn overlaps_vertically(&self, other: &Rect) -> bool {
        self.y < other.y + other.height && self.y + self.height > other.y
    }

    /// Standard AABB intersection; touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.overlaps_horizontally(other) && self.overlaps_vertically(other)
    }
}

/// Outcome of testing the agent against the live obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Contact {
    /// Agent shares at least one column with the pipe.
    pub horizontal_overlap: bool,
    /// Agent intersects the safe gap (policy A only).
    pub in_safe_space: bool,
    /// Agent hit the pipe; ends the episode.
    pub unsafe_overlap: bool,
}

/// How the agent is judged against the obstacle. Chosen once per environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// A gap band of `gap_height` centred on the obstacle's gap position.
    /// Overlapping the pipe outside the band is fatal; passing through the
    /// band pays 3.0 per tick, anything else 1.0.
    SafeGap { gap_height: i32 },
    /// Pipe rises from the ground to half the obstacle's gap value. Flat 1.0
    /// reward while alive.
    HeightCutoff,
}

impl Default for CollisionPolicy {
    fn default() -> Self {
        CollisionPolicy::SafeGap {
            gap_height: DEFAULT_GAP_HEIGHT,
        }
    }
}

impl CollisionPolicy {
    pub fn classify(&self, agent: &Rect, obstacle: &Obstacle) -> Contact {
        let pipe = Rect::new(obstacle.x, 0, obstacle.width, 0);
        let horizontal_overlap = agent.overlaps_horizontally(&pipe);

        match *self {
            CollisionPolicy::SafeGap { gap_height } => {
                let in_safe_space = agent.overlaps(&gap_rect(obstacle, gap_height));
                Contact {
                    horizontal_overlap,
                    in_safe_space,
                    unsafe_overlap: horizontal_overlap && !in_safe_space,
                }
            }
            CollisionPolicy::HeightCutoff => Contact {
                horizontal_overlap,
                in_safe_space: false,
                unsafe_overlap: horizontal_overlap && agent.y < obstacle.gap / 2,
            },
        }
    }

    /// Reward for a tick that did not end the episode.
    pub fn reward(&self, contact: &Contact) -> f64 {
        match self {
            CollisionPolicy::SafeGap { .. } if contact.in_safe_space => 3.0,
            _ => 1.0,
        }
    }

    /// Vertical span `[low, high)` of the pipe column the agent may occupy.
    pub fn safe_band(&self, obstacle: &Obstacle, screen: ScreenSize) -> (i32, i32) {
        match *self {
            CollisionPolicy::SafeGap { gap_height } => {
                let gap = gap_rect(obstacle, gap_height);
                (gap.y, gap.y + gap.height)
            }
            CollisionPolicy::HeightCutoff => (obstacle.gap / 2, screen.height),
        }
    }
}

fn gap_rect(obstacle: &Obstacle, gap_height: i32) -> Rect {
    Rect::new(
        obstacle.x,
        obstacle.gap - gap_height / 2,
        obstacle.width,
        gap_height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAFE_GAP: CollisionPolicy = CollisionPolicy::SafeGap { gap_height: 100 };

    fn bird(y: i32) -> Rect {
        Rect::new(70, y, 10, 10)
    }

    fn pipe(x: i32, gap: i32) -> Obstacle {
        Obstacle { x, gap, width: 20 }
    }

    #[test]
    fn test_rect_overlap_excludes_touching_edges() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.overlaps(&Rect::new(9, 9, 5, 5)));
        assert!(!a.overlaps(&Rect::new(10, 0, 5, 5)));
        assert!(!a.overlaps(&Rect::new(0, 10, 5, 5)));
    }

    #[test]
    fn test_safe_gap_inside_band() {
        let contact = SAFE_GAP.classify(&bird(195), &pipe(65, 200));
        assert!(contact.horizontal_overlap);
        assert!(contact.in_safe_space);
        assert!(!contact.unsafe_overlap);
        assert_eq!(SAFE_GAP.reward(&contact), 3.0);
    }

    #[test]
    fn test_safe_gap_outside_band_is_fatal() {
        let below = SAFE_GAP.classify(&bird(100), &pipe(65, 200));
        assert!(below.horizontal_overlap);
        assert!(!below.in_safe_space);
        assert!(below.unsafe_overlap);

        let above = SAFE_GAP.classify(&bird(300), &pipe(65, 200));
        assert!(above.unsafe_overlap);
    }

    #[test]
    fn test_safe_gap_partial_band_overlap_is_safe() {
        // Band spans [150, 250); a bird at 245 still intersects it
        let contact = SAFE_GAP.classify(&bird(245), &pipe(65, 200));
        assert!(contact.in_safe_space);
        assert!(!contact.unsafe_overlap);

        let contact = SAFE_GAP.classify(&bird(250), &pipe(65, 200));
        assert!(contact.unsafe_overlap);
    }

    #[test]
    fn test_no_horizontal_overlap_is_safe() {
        for policy in [SAFE_GAP, CollisionPolicy::HeightCutoff] {
            let contact = policy.classify(&bird(5), &pipe(300, 200));
            assert!(!contact.horizontal_overlap);
            assert!(!contact.unsafe_overlap);
            assert_eq!(policy.reward(&contact), 1.0);
        }
    }

    #[test]
    fn test_height_cutoff() {
        let policy = CollisionPolicy::HeightCutoff;
        let low = policy.classify(&bird(99), &pipe(65, 200));
        assert!(low.unsafe_overlap);

        let high = policy.classify(&bird(100), &pipe(65, 200));
        assert!(high.horizontal_overlap);
        assert!(!high.unsafe_overlap);
        assert_eq!(policy.reward(&high), 1.0);
    }

    #[test]
    fn test_safe_band() {
        let screen = ScreenSize::new(400, 400);
        assert_eq!(SAFE_GAP.safe_band(&pipe(65, 200), screen), (150, 250));
        assert_eq!(CollisionPolicy::HeightCutoff.safe_band(&pipe(65, 200), screen), (100, 400));
    }
}
