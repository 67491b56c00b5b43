use crate::random::RandomSource;

// Permutation lazily draws `sample_size` distinct indices from
// `[0, population)` with a partial Fisher-Yates shuffle. One index is fixed
// per call to next(), so nothing is drawn that is never asked for.
pub struct Permutation<'r> {
    pool: Vec<usize>,
    drawn: usize,
    sample_size: usize,
    rand: &'r mut RandomSource,
}

impl<'r> Permutation<'r> {
    /// # Panics
    ///
    /// Panics if `sample_size > population`.
    pub fn new(population: usize, sample_size: usize, rand: &'r mut RandomSource) -> Self {
        assert!(
            sample_size <= population,
            "cannot sample {} of {}",
            sample_size,
            population
        );
        Permutation {
            pool: (0..population).collect(),
            drawn: 0,
            sample_size,
            rand,
        }
    }

    pub fn has_next(&self) -> bool {
        self.drawn < self.sample_size
    }
}

impl Iterator for Permutation<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if !self.has_next() {
            return None;
        }
        let pick = self.rand.get_random_int(self.drawn, self.pool.len() - 1);
        self.pool.swap(self.drawn, pick);
        let item = self.pool[self.drawn];
        self.drawn += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.sample_size - self.drawn;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Permutation<'_> {}
