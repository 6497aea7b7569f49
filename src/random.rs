//! Uniform random draws for level assignment.
//!
//! Level assignment only needs one capability, a uniform `f64` in `[0, 1)`.
//! [`LcgSource`] is the reference generator: a fixed linear-congruential
//! recurrence whose output is bit-for-bit reproducible across platforms and
//! implementations. [`RngSource`] adapts any [`rand`] generator for callers
//! that don't need cross-implementation reproducibility.

use rand::{Rng, RngCore};

/// Source of uniform draws in `[0, 1)`.
pub trait UniformSource {
    /// Next uniform value in `[0, 1)`.
    fn next_uniform(&mut self) -> f64;
}

const LCG_MULTIPLIER: u64 = 1_103_515_245;
const LCG_INCREMENT: u64 = 12_345;
const LCG_MODULUS: u64 = 1 << 31;

/// Default seed for [`LcgSource`].
pub const DEFAULT_SEED: u64 = 12_345;

/// Linear-congruential generator:
/// `state = (state * 1103515245 + 12345) mod 2^31`, `value = state / 2^31`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcgSource {
    state: u64,
}

impl LcgSource {
    /// Create a generator from `seed` (reduced mod 2^31).
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed % LCG_MODULUS,
        }
    }

    /// Advance and return the raw 31-bit state.
    pub fn next_u31(&mut self) -> u32 {
        // state < 2^31 and the multiplier < 2^31, so the product fits in u64.
        self.state = (self.state * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS;
        self.state as u32
    }
}

impl Default for LcgSource {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl UniformSource for LcgSource {
    fn next_uniform(&mut self) -> f64 {
        f64::from(self.next_u31()) / LCG_MODULUS as f64
    }
}

/// Adapter exposing any [`RngCore`] as a [`UniformSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: RngCore> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore> UniformSource for RngSource<R> {
    fn next_uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

impl<S: UniformSource + ?Sized> UniformSource for &mut S {
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

impl<S: UniformSource + ?Sized> UniformSource for Box<S> {
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}
