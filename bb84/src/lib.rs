//! # bb84
//!
//! Simulation of the BB84 quantum key distribution handshake between Alice
//! and Bob: random bit/basis choice, encoding into qubit preparations,
//! measurement through a pluggable quantum execution service, basis sifting,
//! and key verification with mismatch diagnostics.
//!
//! ```text
//! RandomSource → encode → ExecutionAdapter → interpret → sift → verify → report
//! ```
//!
//! The execution service is the only suspending step. [`simulator::LocalSimulator`]
//! is an in-process state-vector implementation; anything implementing
//! [`execution::QuantumExecutionService`] can replace it.

pub mod bb84;
pub mod bb84_states;
pub mod circuit;
pub mod config;
pub mod error;
pub mod execution;
pub mod interpret;
pub mod noise;
pub mod protocol;
pub mod randomness;
pub mod report;
pub mod sifting;
pub mod simulator;
pub mod verify;

#[cfg(test)]
mod tests;

pub mod prelude {
    pub use crate::bb84::{encode, encode_all, QubitProgram};
    pub use crate::bb84_states::{Basis, Bit, Gate, MeasurementBasis, QubitPreparation};
    pub use crate::circuit::CircuitDiagram;
    pub use crate::config::ProtocolConfig;
    pub use crate::error::*;
    pub use crate::execution::{
        ExecutionAdapter, ExecutionRequest, ExecutionResponse, OutcomeHistogram, QuantumExecutionService,
        RawOutcome, SubmissionPolicy,
    };
    pub use crate::interpret::{interpret, OutcomeReduction};
    pub use crate::noise::NoiseChannel;
    pub use crate::protocol::{Protocol, ProtocolRecord, Stage};
    pub use crate::randomness::{generate, PartyChoices, RandomSource};
    pub use crate::report::ProtocolReport;
    pub use crate::sifting::{sift, AgreementMask, SiftedKeys};
    pub use crate::simulator::LocalSimulator;
    pub use crate::verify::{diagnose, verify, verify_keys, BasisDiagnostics, MismatchRecord, VerificationResult};
}
