//! Injectable random sources
//!
//! The engine never touches a global RNG. Everything random flows through a
//! `RandomSource` handed in by the caller, so a run is fully reproducible from
//! its seed (or from a scripted draw sequence in tests).

use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::Normal;

use crate::error::{FundError, FundResult};

/// Source of the two kinds of draws the simulation needs
pub trait RandomSource {
    /// Next draw from N(0, 1)
    fn next_standard_normal(&mut self) -> f64;

    /// Next integer drawn uniformly from `low..high_exclusive`
    fn next_int_in_range(&mut self, low: u32, high_exclusive: u32) -> u32;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_standard_normal(&mut self) -> f64 {
        (**self).next_standard_normal()
    }

    fn next_int_in_range(&mut self, low: u32, high_exclusive: u32) -> u32 {
        (**self).next_int_in_range(low, high_exclusive)
    }
}

/// `StdRng`-backed source
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
    normal: Normal,
}

impl SeededRandom {
    /// Reproducible source for a fixed seed
    pub fn seed_from_u64(seed: u64) -> FundResult<Self> {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Source seeded from OS entropy
    pub fn from_entropy() -> FundResult<Self> {
        Self::with_rng(StdRng::from_entropy())
    }

    fn with_rng(rng: StdRng) -> FundResult<Self> {
        let normal = Normal::new(0.0, 1.0).map_err(|e| FundError::InvalidInput {
            field: "normal".into(),
            reason: format!("Invalid Normal parameters: {e}"),
        })?;
        Ok(Self { rng, normal })
    }
}

impl RandomSource for SeededRandom {
    fn next_standard_normal(&mut self) -> f64 {
        self.normal.sample(&mut self.rng)
    }

    fn next_int_in_range(&mut self, low: u32, high_exclusive: u32) -> u32 {
        if high_exclusive <= low {
            return low;
        }
        self.rng.gen_range(low..high_exclusive)
    }
}

/// Replays fixed draw sequences, cycling when exhausted
///
/// Integer draws are clamped into the requested range. An empty normal
/// sequence yields 0.0 (every outcome lands on its stage mean); an empty
/// integer sequence yields the low bound.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    normals: Vec<f64>,
    ints: Vec<u32>,
    normal_pos: usize,
    int_pos: usize,
}

impl ScriptedRandom {
    pub fn new(normals: Vec<f64>, ints: Vec<u32>) -> Self {
        Self {
            normals,
            ints,
            normal_pos: 0,
            int_pos: 0,
        }
    }

    /// Every normal draw is `z`, every holding period is `years`
    pub fn constant(z: f64, years: u32) -> Self {
        Self::new(vec![z], vec![years])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_standard_normal(&mut self) -> f64 {
        if self.normals.is_empty() {
            return 0.0;
        }
        let z = self.normals[self.normal_pos % self.normals.len()];
        self.normal_pos += 1;
        z
    }

    fn next_int_in_range(&mut self, low: u32, high_exclusive: u32) -> u32 {
        let hi = high_exclusive.saturating_sub(1).max(low);
        if self.ints.is_empty() {
            return low;
        }
        let value = self.ints[self.int_pos % self.ints.len()];
        self.int_pos += 1;
        value.clamp(low, hi)
    }
}
