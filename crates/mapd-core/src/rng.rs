//! Deterministic RNG wrapper.
//!
//! # Determinism strategy
//!
//! Every stochastic decision in the engine flows through a [`SeedRng`] owned
//! by exactly one component: the planner holds one (initial orientations,
//! candidate tie-break shuffles) and the dispatcher holds an independent one
//! (agent placement, task arrivals, station picks).  Both are seeded from
//! caller-provided integers, so a run is a pure function of its inputs.
//! There is no global RNG state anywhere.

use rand::distributions::Distribution;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A seeded `SmallRng` with the handful of operations the engine needs.
pub struct SeedRng(SmallRng);

impl SeedRng {
    pub fn new(seed: u64) -> SeedRng {
        SeedRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for `rand` APIs that take `&mut impl Rng`
    /// (e.g. `rand::seq::index::sample`).
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Draw one value from `distribution`.
    #[inline]
    pub fn sample<T, D: Distribution<T>>(&mut self, distribution: D) -> T {
        self.0.sample(distribution)
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }
}
