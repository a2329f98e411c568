use crate::core::speed_model::{SPEED_ADJUSTMENT_FACTOR_MAX, SPEED_ADJUSTMENT_FACTOR_MIN};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// RandomSource provides the random draws of a single runner. Every runner owns its own source,
/// such that the sequences of different runners are independent.
pub trait RandomSource: Send {
    /// next_unit returns a uniform draw in [0, 1).
    fn next_unit(&mut self) -> f64;

    /// next_speed_adjustment_factor returns a uniform integer in
    /// [SPEED_ADJUSTMENT_FACTOR_MIN, SPEED_ADJUSTMENT_FACTOR_MAX].
    fn next_speed_adjustment_factor(&mut self) -> i32;
}

#[derive(Debug, Clone)]
pub struct SmallRngSource {
    rng: SmallRng,
}

impl SmallRngSource {
    pub fn from_entropy() -> SmallRngSource {
        SmallRngSource {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn seed_from_u64(seed: u64) -> SmallRngSource {
        SmallRngSource {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SmallRngSource {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn next_speed_adjustment_factor(&mut self) -> i32 {
        self.rng
            .gen_range(SPEED_ADJUSTMENT_FACTOR_MIN..=SPEED_ADJUSTMENT_FACTOR_MAX)
    }
}
