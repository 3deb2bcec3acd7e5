use std::time::Duration;
use thiserror::Error;

/// Failure talking to the quantum execution service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Execution service unavailable: {0}")]
    Unavailable(String),

    #[error("Execution service rejected the batch: {0}")]
    Rejected(String),

    #[error("Execution service returned {got} results for a batch of {expected}")]
    IncompleteResult { expected: usize, got: usize },

    #[error("Execution request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Execution failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<ExecutionError>,
    },
}

impl ExecutionError {
    /// Whether resubmitting the same batch may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ExecutionError::Unavailable(_) | ExecutionError::Timeout(_))
    }
}

/// Two sequences that must be paired position by position have different lengths.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Length mismatch in {context}: expected {expected}, got {got}")]
pub struct LengthMismatchError {
    pub context: &'static str,
    pub expected: usize,
    pub got: usize,
}

impl LengthMismatchError {
    /// Returns an error when `got` differs from `expected`.
    pub fn check(context: &'static str, expected: usize, got: usize) -> Result<(), Self> {
        if expected == got {
            Ok(())
        } else {
            Err(LengthMismatchError {
                context,
                expected,
                got,
            })
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpretationError {
    #[error("No outcome recorded for qubit {index}")]
    Empty { index: usize },

    #[error("Outcome for qubit {index} is ambiguous: {labels:?}")]
    Ambiguous { index: usize, labels: Vec<String> },

    #[error("Qubit {index} has {shots} shots, single-shot reduction needs exactly 1")]
    ShotCount { index: usize, shots: usize },

    #[error("Unrecognised outcome label {label:?} for qubit {index}")]
    UnrecognisedLabel { index: usize, label: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Shot count must be at least 1")]
    ZeroShots,

    #[error("Single-shot reduction cannot interpret {0} shots per qubit")]
    ShotsNeedMajority(u32),

    #[error("Invalid noise probability: {0}. Must be between 0.0 and 1.0")]
    InvalidProbability(f64),
}

/// Any failure that aborts a protocol run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("{0}")]
    LengthMismatch(#[from] LengthMismatchError),

    #[error("Interpretation error: {0}")]
    Interpretation(#[from] InterpretationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
