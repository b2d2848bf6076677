use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of oracle index assignments.
///
/// Index assignment is the only non-deterministic input of the core, so it
/// is injected as a capability: production code uses [`RandomIndexSource`],
/// tests supply their own implementation with a fixed draw sequence.
pub trait IndexSource: Send + Sync {
    /// Draws one index from `0..space`.
    fn draw(&mut self, space: u8) -> u8;
}

/// Default [`IndexSource`] backed by a seeded standard RNG.
pub struct RandomIndexSource {
    rng: StdRng,
}

impl RandomIndexSource {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for RandomIndexSource {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexSource for RandomIndexSource {
    fn draw(&mut self, space: u8) -> u8 {
        self.rng.gen_range(0..space)
    }
}
