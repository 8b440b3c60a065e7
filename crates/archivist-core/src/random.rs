//! Random index sources for template selection.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniformly distributed indices.
pub trait IndexSource: Send {
    /// Return an index in `0..len`; `len` is never zero.
    fn next_index(&mut self, len: usize) -> usize;
}

/// Index source backed by the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl IndexSource for ThreadRngSource {
    fn next_index(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len.max(1))
    }
}

/// Reproducible index source seeded from a fixed value.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    /// Create a source from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl IndexSource for SeededSource {
    fn next_index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len.max(1))
    }
}
