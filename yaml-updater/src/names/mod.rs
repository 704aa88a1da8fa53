//! Branch name generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

/// Characters used for generated suffixes: no vowels, no `0`, `1` or `3`.
const ALPHANUMS: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";

/// Length of the random suffix appended to a prefix.
const SUFFIX_LEN: usize = 5;

/// Generates branch names from a prefix.
pub trait NameGenerator: Send + Sync {
    /// Returns `prefix` followed by a suffix that is unlikely to collide with
    /// an existing branch.
    fn prefixed_name(&self, prefix: &str) -> String;
}

/// Appends a random suffix drawn from an owned, seedable generator.
#[derive(Debug)]
pub struct RandomNameGenerator {
    rng: Mutex<StdRng>,
}

impl RandomNameGenerator {
    /// Creates a generator with a fixed seed; the sequence of names is
    /// reproducible.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Creates a generator seeded from the wall clock.
    #[must_use]
    pub fn from_time() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        Self::with_seed(nanos as u64)
    }
}

impl Default for RandomNameGenerator {
    fn default() -> Self {
        Self::from_time()
    }
}

impl NameGenerator for RandomNameGenerator {
    fn prefixed_name(&self, prefix: &str) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| char::from(ALPHANUMS[rng.random_range(0..ALPHANUMS.len())]))
            .collect();
        format!("{prefix}{suffix}")
    }
}
