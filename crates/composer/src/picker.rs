//! Seedable template selection.
//!
//! Template choice is the only nondeterminism in composition, so it
//! goes through an injectable picker: production uses entropy, tests
//! seed it and get reproducible replies.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct TemplatePicker {
    rng: StdRng,
}

impl TemplatePicker {
    /// A picker seeded for reproducible selection.
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// A picker seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    /// Pick one entry from a non-empty pool.
    pub fn pick<'a, S: AsRef<str>>(&mut self, pool: &'a [S]) -> &'a str {
        let index = self.rng.gen_range(0..pool.len());
        pool[index].as_ref()
    }

    /// Pick up to `count` distinct entries, preserving pool order.
    pub fn pick_many<'a, S: AsRef<str>>(&mut self, pool: &'a [S], count: usize) -> Vec<&'a str> {
        if count >= pool.len() {
            return pool.iter().map(|s| s.as_ref()).collect();
        }
        let mut indices: Vec<usize> = (0..pool.len()).collect();
        for i in 0..count {
            let j = self.rng.gen_range(i..indices.len());
            indices.swap(i, j);
        }
        let mut chosen = indices[..count].to_vec();
        chosen.sort_unstable();
        chosen.into_iter().map(|i| pool[i].as_ref()).collect()
    }
}
