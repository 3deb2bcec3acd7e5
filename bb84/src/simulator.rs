//! Local state-vector execution service.
//!
//! Each program acts on a single qubit starting in |0⟩. Preparation gates
//! run first, then the configured channel noise (the qubit "in flight"),
//! then the measuring party's basis change and a computational-basis
//! measurement. Every shot re-runs the program from scratch.

use async_trait::async_trait;
use log::trace;
use num_complex::Complex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::FRAC_1_SQRT_2;

use crate::bb84::QubitProgram;
use crate::bb84_states::Gate;
use crate::error::ExecutionError;
use crate::execution::{ExecutionRequest, ExecutionResponse, OutcomeHistogram, QuantumExecutionService};
use crate::noise::{apply_matrix, Amplitudes, Matrix2x2, NoiseChannel};

/// Probabilities this close to 0 or 1 are treated as exact.
const PROBABILITY_EPSILON: f64 = 1e-12;

fn gate_matrix(gate: Gate) -> Option<Matrix2x2> {
    let zero = Complex::new(0.0, 0.0);
    let one = Complex::new(1.0, 0.0);
    let h = Complex::new(FRAC_1_SQRT_2, 0.0);
    match gate {
        Gate::X => Some([zero, one, one, zero]),
        Gate::H => Some([h, h, h, -h]),
        Gate::Measure => None,
    }
}

#[derive(Debug, Clone)]
pub struct LocalSimulator {
    rng: StdRng,
    noise: Option<NoiseChannel>,
}

impl LocalSimulator {
    /// Noise-free simulator with its own entropy-seeded generator.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            noise: None,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            noise: None,
        }
    }

    pub fn with_noise(mut self, noise: NoiseChannel) -> Self {
        self.noise = Some(noise);
        self
    }

    pub fn noise(&self) -> Option<NoiseChannel> {
        self.noise
    }

    /// Run one shot of `program` and return the measured bit.
    pub fn run_shot(&mut self, program: &QubitProgram) -> Result<bool, ExecutionError> {
        let mut state: Amplitudes = [Complex::new(1.0, 0.0), Complex::new(0.0, 0.0)];
        let prepared = program.preparation_len();

        for (i, &gate) in program.gates().iter().enumerate() {
            if i == prepared {
                if let Some(noise) = self.noise {
                    noise.apply(&mut state, &mut self.rng);
                }
            }
            match gate_matrix(gate) {
                Some(m) => state = apply_matrix(&m, &state),
                None => return Ok(self.measure(&state)),
            }
        }

        Err(ExecutionError::Rejected(format!(
            "program for {} has no measurement",
            program.preparation()
        )))
    }

    fn measure(&mut self, state: &Amplitudes) -> bool {
        let p_one = state[1].norm_sqr();
        let p_zero = state[0].norm_sqr();
        let total = p_zero + p_one;
        let p_one = if total > 0.0 { p_one / total } else { 0.0 };

        if p_one < PROBABILITY_EPSILON {
            false
        } else if p_one > 1.0 - PROBABILITY_EPSILON {
            true
        } else {
            self.rng.gen::<f64>() < p_one
        }
    }
}

impl Default for LocalSimulator {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[async_trait]
impl QuantumExecutionService for LocalSimulator {
    fn name(&self) -> &str {
        "local-statevector"
    }

    async fn execute(&mut self, request: ExecutionRequest) -> Result<ExecutionResponse, ExecutionError> {
        if request.shots == 0 {
            return Err(ExecutionError::Rejected("shot count must be positive".to_string()));
        }

        let mut outcomes = Vec::with_capacity(request.programs.len());
        for program in &request.programs {
            let mut histogram = OutcomeHistogram::new();
            for _ in 0..request.shots {
                let one = self.run_shot(program)?;
                histogram.record(if one { "1" } else { "0" });
            }
            trace!("{:?} -> {:?}", program.gates(), histogram.counts());
            outcomes.push(histogram);
            // Hand control back so the caller's deadline can fire mid-batch.
            tokio::task::yield_now().await;
        }
        Ok(ExecutionResponse { outcomes })
    }
}
