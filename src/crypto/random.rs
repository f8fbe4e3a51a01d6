//! Non-cryptographic pseudorandom numbers.
//!
//! Never use this for keys or IVs; those come from the OS generator in
//! [`crate::crypto::supplier`].

use crate::error::{CryptoError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// An explicitly owned pseudorandom generator.
///
/// There is no process-wide instance: callers create one and pass it where
/// needed. Methods take `&mut self`, so sharing across threads requires the
/// caller to wrap it in a lock.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource {
    /// Seeds from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A non-negative number below `i32::MAX`.
    pub fn number(&mut self) -> i32 {
        self.rng.gen_range(0..i32::MAX)
    }

    /// A number in `[0, max)`; `max == 0` yields 0.
    pub fn number_below(&mut self, max: i32) -> Result<i32> {
        self.number_between(0, max)
    }

    /// A number in `[min, max)`; `min == max` yields `min`.
    pub fn number_between(&mut self, min: i32, max: i32) -> Result<i32> {
        if min < 0 {
            return Err(CryptoError::invalid(format!("minimum {min} is negative")));
        }
        if min > max {
            return Err(CryptoError::invalid(format!(
                "minimum {min} is greater than maximum {max}"
            )));
        }
        if min == max {
            return Ok(min);
        }
        Ok(self.rng.gen_range(min..max))
    }
}
