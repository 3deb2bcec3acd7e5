use std::time::Duration;

use crate::error::ConfigError;
use crate::execution::SubmissionPolicy;
use crate::interpret::OutcomeReduction;
use crate::noise::NoiseChannel;

/// Configuration for one protocol run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolConfig {
    /// Number of qubits Alice sends (N)
    pub length: usize,
    /// Run seed; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Shots per qubit requested from the execution service
    pub shots: u32,
    /// How multi-shot histograms are reduced to one bit
    pub reduction: OutcomeReduction,
    /// Channel noise for the local simulator; `None` is ideal
    pub noise: Option<NoiseChannel>,
    /// Resubmissions after a transient execution failure
    pub max_retries: u32,
    /// Deadline for each batch submission
    pub timeout: Duration,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            length: 4,
            seed: None,
            shots: 1,
            reduction: OutcomeReduction::SingleShot,
            noise: None,
            max_retries: 2,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ProtocolConfig {
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_shots(mut self, shots: u32, reduction: OutcomeReduction) -> Self {
        self.shots = shots;
        self.reduction = reduction;
        self
    }

    pub fn with_noise(mut self, noise: NoiseChannel) -> Self {
        self.noise = Some(noise);
        self
    }

    pub fn with_retries(mut self, max_retries: u32, timeout: Duration) -> Self {
        self.max_retries = max_retries;
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shots == 0 {
            return Err(ConfigError::ZeroShots);
        }
        if self.shots > 1 && self.reduction == OutcomeReduction::SingleShot {
            return Err(ConfigError::ShotsNeedMajority(self.shots));
        }
        if let Some(noise) = &self.noise {
            noise.validate()?;
        }
        Ok(())
    }

    pub fn submission_policy(&self) -> SubmissionPolicy {
        SubmissionPolicy {
            shots: self.shots,
            max_retries: self.max_retries,
            timeout: self.timeout,
        }
    }
}
