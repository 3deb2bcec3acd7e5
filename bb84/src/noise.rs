//! Channel noise applied to a qubit in flight between Alice and Bob.
//!
//! Noise is simulated by Monte Carlo Kraus sampling: one operator K is drawn
//! with probability ||K|ψ⟩||², applied, and the state renormalised.

use num_complex::Complex;
use rand::Rng;
use std::fmt;

use crate::error::ConfigError;

/// A single-qubit 2x2 matrix stored as [row0col0, row0col1, row1col0, row1col1].
pub type Matrix2x2 = [Complex<f64>; 4];

/// Single-qubit amplitudes [α, β] for α|0⟩ + β|1⟩.
pub type Amplitudes = [Complex<f64>; 2];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoiseChannel {
    /// With probability p, applies X.
    BitFlip { p: f64 },

    /// Phase-flip channel: with probability p, applies Z.
    Dephasing { p: f64 },

    /// With probability p, applies a random Pauli.
    /// Kraus: {√(1-p)·I, √(p/3)·X, √(p/3)·Y, √(p/3)·Z}
    Depolarizing { p: f64 },

    /// Energy relaxation towards |0⟩.
    /// Kraus: {[[1,0],[0,√(1-γ)]], [[0,√γ],[0,0]]}
    AmplitudeDamping { gamma: f64 },
}

impl NoiseChannel {
    pub fn strength(&self) -> f64 {
        match *self {
            NoiseChannel::BitFlip { p }
            | NoiseChannel::Dephasing { p }
            | NoiseChannel::Depolarizing { p } => p,
            NoiseChannel::AmplitudeDamping { gamma } => gamma,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = self.strength();
        if (0.0..=1.0).contains(&p) {
            Ok(())
        } else {
            Err(ConfigError::InvalidProbability(p))
        }
    }

    /// Kraus operators for this channel.
    pub fn kraus_operators(&self) -> Vec<Matrix2x2> {
        let zero = Complex::new(0.0, 0.0);
        let one = Complex::new(1.0, 0.0);
        let i = Complex::new(0.0, 1.0);
        let real = |x: f64| Complex::new(x, 0.0);

        match *self {
            NoiseChannel::BitFlip { p } => {
                let p = p.clamp(0.0, 1.0);
                let id = real((1.0 - p).sqrt());
                let flip = real(p.sqrt());
                vec![[id, zero, zero, id], [zero, flip, flip, zero]]
            }
            NoiseChannel::Dephasing { p } => {
                let p = p.clamp(0.0, 1.0);
                let id = real((1.0 - p).sqrt());
                let phase = real(p.sqrt());
                vec![[id, zero, zero, id], [phase, zero, zero, -phase]]
            }
            NoiseChannel::Depolarizing { p } => {
                let p = p.clamp(0.0, 1.0);
                let id = real((1.0 - p).sqrt());
                let s = real((p / 3.0).sqrt());
                vec![
                    [id, zero, zero, id],
                    [zero, s, s, zero],
                    [zero, -i * s, i * s, zero],
                    [s, zero, zero, -s],
                ]
            }
            NoiseChannel::AmplitudeDamping { gamma } => {
                let gamma = gamma.clamp(0.0, 1.0);
                vec![
                    [one, zero, zero, real((1.0 - gamma).sqrt())],
                    [zero, real(gamma.sqrt()), zero, zero],
                ]
            }
        }
    }

    /// Apply one sampled Kraus operator to `state` in place.
    pub fn apply<R: Rng + ?Sized>(&self, state: &mut Amplitudes, rng: &mut R) {
        let candidates: Vec<(Amplitudes, f64)> = self
            .kraus_operators()
            .iter()
            .map(|k| {
                let next = apply_matrix(k, state);
                let weight = next[0].norm_sqr() + next[1].norm_sqr();
                (next, weight)
            })
            .collect();

        let r: f64 = rng.gen();
        let mut cumulative = 0.0;
        let mut chosen = None;
        for (next, weight) in &candidates {
            cumulative += weight;
            if *weight > 0.0 && r < cumulative {
                chosen = Some((*next, *weight));
                break;
            }
        }
        // Floating-point leftovers fall through to the last operator with weight.
        let chosen = chosen.or_else(|| candidates.iter().rev().find(|(_, w)| *w > 0.0).copied());

        if let Some((next, weight)) = chosen {
            let norm = weight.sqrt();
            *state = [next[0] / norm, next[1] / norm];
        }
    }
}

impl fmt::Display for NoiseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            NoiseChannel::BitFlip { p } => write!(f, "bit-flip(p={})", p),
            NoiseChannel::Dephasing { p } => write!(f, "dephasing(p={})", p),
            NoiseChannel::Depolarizing { p } => write!(f, "depolarizing(p={})", p),
            NoiseChannel::AmplitudeDamping { gamma } => write!(f, "amplitude-damping(γ={})", gamma),
        }
    }
}

pub fn apply_matrix(m: &Matrix2x2, state: &Amplitudes) -> Amplitudes {
    [
        m[0] * state[0] + m[1] * state[1],
        m[2] * state[0] + m[3] * state[1],
    ]
}
