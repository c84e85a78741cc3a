use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Seedable random source owned by one environment instance.
///
/// Only obstacle respawns draw from it, so a fixed seed plus a fixed action
/// sequence replays the same gap positions.
#[derive(Debug, Clone)]
pub struct RngProvider {
    rng: StdRng,
    seed: u64,
}

impl RngProvider {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Reinitialize the generator and return the effective seed.
    pub fn reseed(&mut self, seed: Option<u64>) -> u64 {
        *self = Self::new(seed);
        debug!(seed = self.seed, "rng seeded");
        self.seed
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform integer in `[low, high)`.
    pub fn gen_range(&mut self, low: i32, high: i32) -> i32 {
        self.rng.gen_range(low..high)
    }
}
