//! Random source - the only way the weaver draws entropy.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Entropy capability threaded through every operation that needs it.
pub trait RandomSource {
    /// Uniform index in `[0, n)`. `n` must be positive.
    fn uniform_index(&mut self, n: usize) -> usize;

    /// Integer from a normal-like distribution centred between `min` and `max`.
    fn bounded_normal(&mut self, min: i64, max: i64) -> i64;
}

/// Redraws before an out-of-range normal sample is clamped.
const NORMAL_REDRAWS: usize = 16;

/// Seedable, serializable random stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomStream {
    seed: u64,
    rng: ChaCha8Rng,
}

impl RandomStream {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The seed this stream was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn standard_normal(&mut self) -> f64 {
        // Box-Muller; u1 is kept away from zero for the logarithm.
        let u1: f64 = 1.0 - self.rng.gen::<f64>();
        let u2: f64 = self.rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }
}

impl Default for RandomStream {
    fn default() -> Self {
        Self::new(0)
    }
}

impl RandomSource for RandomStream {
    fn uniform_index(&mut self, n: usize) -> usize {
        debug_assert!(n > 0, "uniform_index requires a non-empty range");
        self.rng.gen_range(0..n.max(1))
    }

    fn bounded_normal(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        let mean = (min + max) as f64 / 2.0;
        let std_dev = (max - min) as f64 / 4.0;

        let mut value = mean;
        for _ in 0..NORMAL_REDRAWS {
            value = (mean + self.standard_normal() * std_dev).round();
            if value >= min as f64 && value <= max as f64 {
                break;
            }
        }
        (value as i64).clamp(min, max)
    }
}
