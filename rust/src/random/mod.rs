use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

// RandomSource is the one generator a run draws from. Each thread gets its
// own source via fork(), so no generator is ever shared.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    pub fn seeded(seed: u64) -> Self {
        RandomSource {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        RandomSource {
            rng: StdRng::from_entropy(),
        }
    }

    /// Uniform integer in `[low, high]`, both ends inclusive.
    ///
    /// # Panics
    ///
    /// Panics if `low > high`.
    pub fn get_random_int(&mut self, low: usize, high: usize) -> usize {
        assert!(low <= high, "empty range [{}, {}]", low, high);
        self.rng.gen_range(low..=high)
    }

    // Derives an independent source; deterministic when self is seeded.
    pub fn fork(&mut self) -> RandomSource {
        RandomSource::seeded(self.rng.next_u64())
    }
}
