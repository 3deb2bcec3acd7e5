//! The BB84 handshake as one strictly sequential pipeline.
//!
//! `Init → Generated → Encoded → Measured → Interpreted → Sifted → Verified → Reported`
//!
//! Each stage consumes the complete output of the previous one. A key
//! mismatch is an ordinary outcome carried in the record; only execution,
//! interpretation and length errors abort a run.

use log::{debug, info, warn};
use std::fmt;

use crate::bb84::{encode_all, QubitProgram};
use crate::bb84_states::{Basis, Bit, QubitPreparation};
use crate::config::ProtocolConfig;
use crate::error::{ConfigError, LengthMismatchError, ProtocolError};
use crate::execution::{ExecutionAdapter, QuantumExecutionService, RawOutcome};
use crate::interpret::interpret;
use crate::randomness::{generate, PartyChoices, BOB_SEED_OFFSET, SIMULATOR_SEED_OFFSET};
use crate::report::ProtocolReport;
use crate::sifting::{AgreementMask, SiftedKeys};
use crate::simulator::LocalSimulator;
use crate::verify::{verify, BasisDiagnostics, VerificationResult};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    Generated,
    Encoded,
    Measured,
    Interpreted,
    Sifted,
    Verified,
    Reported,
}

impl Stage {
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Init => Some(Stage::Generated),
            Stage::Generated => Some(Stage::Encoded),
            Stage::Encoded => Some(Stage::Measured),
            Stage::Measured => Some(Stage::Interpreted),
            Stage::Interpreted => Some(Stage::Sifted),
            Stage::Sifted => Some(Stage::Verified),
            Stage::Verified => Some(Stage::Reported),
            Stage::Reported => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Tracks the pipeline position; stages can only move forward one at a time.
#[derive(Debug)]
struct StageTracker {
    stage: Stage,
}

impl StageTracker {
    fn new() -> Self {
        Self { stage: Stage::Init }
    }

    fn advance(&mut self) -> Stage {
        if let Some(next) = self.stage.next() {
            debug!("{} -> {}", self.stage, next);
            self.stage = next;
        }
        self.stage
    }
}

/// Everything one run produced, in pipeline order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolRecord {
    pub alice: PartyChoices,
    pub bob_bases: Vec<Basis>,
    pub preparations: Vec<QubitPreparation>,
    pub programs: Vec<QubitProgram>,
    pub raw_outcomes: Vec<RawOutcome>,
    pub bob_bits: Vec<Bit>,
    pub keys: SiftedKeys,
    pub verification: VerificationResult,
    pub diagnostics: BasisDiagnostics,
    pub stage: Stage,
}

impl ProtocolRecord {
    pub fn len(&self) -> usize {
        self.alice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alice.is_empty()
    }

    /// Finish the run: the record moves to `Reported`.
    pub fn report(mut self) -> ProtocolReport {
        if let Some(next) = self.stage.next() {
            debug!("{} -> {}", self.stage, next);
            self.stage = next;
        }
        ProtocolReport::new(self)
    }
}

pub struct Protocol<S> {
    config: ProtocolConfig,
    adapter: ExecutionAdapter<S>,
}

impl Protocol<LocalSimulator> {
    /// Protocol backed by the in-process simulator, seeded from the run seed.
    pub fn local(config: ProtocolConfig) -> Result<Self, ConfigError> {
        let simulator = match config.seed {
            Some(seed) => LocalSimulator::seeded(seed.wrapping_add(SIMULATOR_SEED_OFFSET)),
            None => LocalSimulator::from_entropy(),
        };
        let simulator = match config.noise {
            Some(noise) => simulator.with_noise(noise),
            None => simulator,
        };
        Self::new(config, simulator)
    }
}

impl<S: QuantumExecutionService> Protocol<S> {
    pub fn new(config: ProtocolConfig, service: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let adapter = ExecutionAdapter::new(service, config.submission_policy());
        Ok(Self { config, adapter })
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        self.adapter.service()
    }

    /// Generate both parties' choices and run the full pipeline once.
    pub async fn run(&mut self) -> Result<ProtocolRecord, ProtocolError> {
        let n = self.config.length;
        let (alice, bob) = match self.config.seed {
            Some(seed) => (
                generate(n, Some(seed)),
                generate(n, Some(seed.wrapping_add(BOB_SEED_OFFSET))),
            ),
            None => (generate(n, None), generate(n, None)),
        };
        // Bob's bits are never sent; only his bases matter.
        self.run_with_choices(alice, bob.bases).await
    }

    /// Run the pipeline from explicit choices.
    pub async fn run_with_choices(
        &mut self,
        alice: PartyChoices,
        bob_bases: Vec<Basis>,
    ) -> Result<ProtocolRecord, ProtocolError> {
        let mut tracker = StageTracker::new();
        info!("Starting BB84 run with {} qubits", alice.len());

        LengthMismatchError::check("alice bases", alice.bits.len(), alice.bases.len())?;
        LengthMismatchError::check("bob bases", alice.len(), bob_bases.len())?;
        tracker.advance();

        let preparations = encode_all(&alice.bits, &alice.bases)?;
        tracker.advance();

        let (programs, raw_outcomes) = self.adapter.measure_batch(&preparations, &bob_bases).await?;
        tracker.advance();

        let bob_bits = interpret(&raw_outcomes, self.config.reduction)?;
        LengthMismatchError::check("measured bits", alice.len(), bob_bits.len())?;
        tracker.advance();

        let mask = AgreementMask::new(&alice.bases, &bob_bases)?;
        let keys = SiftedKeys::new(&mask, &alice.bits, &bob_bits)?;
        tracker.advance();

        let verification = verify(&keys);
        let diagnostics = BasisDiagnostics::from_mask(&mask, &alice.bits, &bob_bits)?;
        let stage = tracker.advance();

        if verification.is_match() {
            info!("Sifted keys match ({} bits)", keys.len());
        } else {
            warn!(
                "Sifted keys differ at {} of {} positions",
                verification.mismatches().len(),
                keys.len()
            );
        }

        Ok(ProtocolRecord {
            alice,
            bob_bases,
            preparations,
            programs,
            raw_outcomes,
            bob_bits,
            keys,
            verification,
            diagnostics,
            stage,
        })
    }
}
