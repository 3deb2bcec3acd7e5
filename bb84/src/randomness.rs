//! Seedable source of bit and basis choices.
//!
//! Every party draws from its own explicitly seeded generator; there is no
//! process-wide RNG state.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bb84_states::{Basis, Bit};

/// Offset applied to a run seed to derive Bob's stream.
pub const BOB_SEED_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;
/// Offset applied to a run seed to derive the simulator's measurement stream.
pub const SIMULATOR_SEED_OFFSET: u64 = 0xD1B5_4A32_D192_ED03;

/// Bits and bases drawn by one party for one run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartyChoices {
    pub bits: Vec<Bit>,
    pub bases: Vec<Basis>,
}

impl PartyChoices {
    pub fn new(bits: Vec<Bit>, bases: Vec<Basis>) -> Self {
        Self { bits, bases }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    /// Deterministic source: the same seed always yields the same choices.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Draw `n` uniform bits followed by `n` uniform bases.
    pub fn generate(&mut self, n: usize) -> PartyChoices {
        let bits = (0..n).map(|_| self.rng.gen::<Bit>()).collect();
        let bases = (0..n).map(|_| self.rng.gen::<Basis>()).collect();
        PartyChoices { bits, bases }
    }
}

/// Generate `n` bits and bases, reproducibly when a seed is given.
pub fn generate(n: usize, seed: Option<u64>) -> PartyChoices {
    let mut source = match seed {
        Some(seed) => RandomSource::seeded(seed),
        None => RandomSource::from_entropy(),
    };
    source.generate(n)
}
