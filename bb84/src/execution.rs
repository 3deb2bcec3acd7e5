//! Boundary to the quantum execution service.
//!
//! The protocol never runs circuits itself. It hands a batch of
//! [`QubitProgram`]s to a [`QuantumExecutionService`] and gets back one
//! outcome histogram per program, in submission order. The local simulator
//! and any remote backend satisfy the same contract.

use async_trait::async_trait;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::bb84::{measurement_programs, QubitProgram};
use crate::bb84_states::{MeasurementBasis, QubitPreparation};
use crate::error::{ExecutionError, ProtocolError};

/// Outcome counts for one program, keyed by classical label ("0" / "1").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutcomeHistogram {
    counts: BTreeMap<String, usize>,
}

impl OutcomeHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// A histogram holding a single one-shot reading.
    pub fn single(label: impl Into<String>) -> Self {
        let mut histogram = Self::new();
        histogram.record(label);
        histogram
    }

    pub fn record(&mut self, label: impl Into<String>) {
        *self.counts.entry(label.into()).or_insert(0) += 1;
    }

    pub fn total_shots(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn counts(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }

    pub fn is_empty(&self) -> bool {
        self.total_shots() == 0
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for OutcomeHistogram {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        let mut histogram = Self::new();
        for (label, count) in iter {
            *histogram.counts.entry(label.into()).or_insert(0) += count;
        }
        histogram
    }
}

/// Backend-reported result for one qubit.
pub type RawOutcome = OutcomeHistogram;

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    pub programs: Vec<QubitProgram>,
    pub shots: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExecutionResponse {
    pub outcomes: Vec<RawOutcome>,
}

/// External collaborator that prepares, evolves and measures qubits.
#[async_trait]
pub trait QuantumExecutionService: Send {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    async fn execute(&mut self, request: ExecutionRequest) -> Result<ExecutionResponse, ExecutionError>;
}

/// Retry and timeout policy around one batch submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubmissionPolicy {
    pub shots: u32,
    pub max_retries: u32,
    pub timeout: Duration,
}

impl Default for SubmissionPolicy {
    fn default() -> Self {
        Self {
            shots: 1,
            max_retries: 2,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Thin adapter that submits measurement batches to an execution service.
pub struct ExecutionAdapter<S> {
    service: S,
    policy: SubmissionPolicy,
}

impl<S: QuantumExecutionService> ExecutionAdapter<S> {
    pub fn new(service: S, policy: SubmissionPolicy) -> Self {
        Self { service, policy }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn into_service(self) -> S {
        self.service
    }

    /// Measure each preparation in the paired basis, one outcome per qubit.
    ///
    /// Returns the programs that were submitted along with the outcomes.
    pub async fn measure_batch(
        &mut self,
        preparations: &[QubitPreparation],
        measurement_bases: &[MeasurementBasis],
    ) -> Result<(Vec<QubitProgram>, Vec<RawOutcome>), ProtocolError> {
        let programs = measurement_programs(preparations, measurement_bases)?;
        let outcomes = self.submit(&programs).await?;
        Ok((programs, outcomes))
    }

    /// Submit a batch, resubmitting the identical batch on transient failure.
    pub async fn submit(&mut self, programs: &[QubitProgram]) -> Result<Vec<RawOutcome>, ExecutionError> {
        let attempts = self.policy.max_retries + 1;
        let mut last = None;

        for attempt in 1..=attempts {
            debug!(
                "Submitting {} programs to {} (attempt {}/{})",
                programs.len(),
                self.service.name(),
                attempt,
                attempts
            );
            match self.attempt(programs).await {
                Ok(outcomes) => return Ok(outcomes),
                Err(e) if e.is_transient() => {
                    warn!("Execution attempt {} failed: {}", attempt, e);
                    last = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        match last {
            Some(last) if attempts > 1 => Err(ExecutionError::RetriesExhausted {
                attempts,
                last: Box::new(last),
            }),
            Some(last) => Err(last),
            None => Err(ExecutionError::Unavailable("no attempt was made".to_string())),
        }
    }

    async fn attempt(&mut self, programs: &[QubitProgram]) -> Result<Vec<RawOutcome>, ExecutionError> {
        let request = ExecutionRequest {
            programs: programs.to_vec(),
            shots: self.policy.shots,
        };
        let timeout = self.policy.timeout;
        let response = tokio::time::timeout(timeout, self.service.execute(request))
            .await
            .map_err(|_| ExecutionError::Timeout(timeout))??;

        if response.outcomes.len() != programs.len() {
            return Err(ExecutionError::IncompleteResult {
                expected: programs.len(),
                got: response.outcomes.len(),
            });
        }
        Ok(response.outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bb84_states::Basis;

    /// Fails a fixed number of times, then answers every program with "0".
    struct Flaky {
        failures_left: u32,
        calls: u32,
        received: Vec<ExecutionRequest>,
        error: ExecutionError,
        drop_one: bool,
    }

    impl Flaky {
        fn new(failures: u32, error: ExecutionError) -> Self {
            Self {
                failures_left: failures,
                calls: 0,
                received: Vec::new(),
                error,
                drop_one: false,
            }
        }
    }

    #[async_trait]
    impl QuantumExecutionService for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn execute(&mut self, request: ExecutionRequest) -> Result<ExecutionResponse, ExecutionError> {
            self.calls += 1;
            self.received.push(request.clone());
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(self.error.clone());
            }
            let mut outcomes: Vec<_> = request.programs.iter().map(|_| OutcomeHistogram::single("0")).collect();
            if self.drop_one {
                outcomes.pop();
            }
            Ok(ExecutionResponse { outcomes })
        }
    }

    struct Stalled;

    #[async_trait]
    impl QuantumExecutionService for Stalled {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn execute(&mut self, _request: ExecutionRequest) -> Result<ExecutionResponse, ExecutionError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(ExecutionResponse::default())
        }
    }

    fn zeros(n: usize) -> (Vec<QubitPreparation>, Vec<Basis>) {
        (vec![QubitPreparation::QubitZero; n], vec![Basis::Z; n])
    }

    #[test]
    fn histogram_counts() {
        let histogram: OutcomeHistogram = vec![("0", 3), ("1", 1), ("0", 1)].into_iter().collect();
        assert_eq!(histogram.total_shots(), 5);
        assert_eq!(histogram.counts().get("0"), Some(&4));
        assert!(OutcomeHistogram::new().is_empty());
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let service = Flaky::new(2, ExecutionError::Unavailable("queue full".into()));
        let mut adapter = ExecutionAdapter::new(service, SubmissionPolicy::default());
        let (preps, bases) = zeros(3);

        let (programs, outcomes) = adapter.measure_batch(&preps, &bases).await.unwrap();
        assert_eq!(programs.len(), 3);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(adapter.service().calls, 3);
    }

    #[tokio::test]
    async fn retries_resubmit_the_identical_batch() {
        let service = Flaky::new(2, ExecutionError::Timeout(Duration::from_millis(5)));
        let policy = SubmissionPolicy {
            shots: 3,
            ..Default::default()
        };
        let mut adapter = ExecutionAdapter::new(service, policy);
        let preps = vec![
            QubitPreparation::QubitOne,
            QubitPreparation::QubitPlus,
            QubitPreparation::QubitMinus,
        ];
        let bases = vec![Basis::X, Basis::Z, Basis::X];

        let (programs, _) = adapter.measure_batch(&preps, &bases).await.unwrap();
        let received = &adapter.service().received;
        assert_eq!(received.len(), 3);
        for request in received {
            assert_eq!(request.programs, programs);
            assert_eq!(request.shots, 3);
        }
    }

    #[tokio::test]
    async fn retries_are_bounded() {
        let service = Flaky::new(10, ExecutionError::Unavailable("down".into()));
        let policy = SubmissionPolicy {
            max_retries: 1,
            ..Default::default()
        };
        let mut adapter = ExecutionAdapter::new(service, policy);
        let (preps, bases) = zeros(2);

        let err = adapter.measure_batch(&preps, &bases).await.unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Execution(ExecutionError::RetriesExhausted { attempts: 2, .. })
        ));
        assert_eq!(adapter.service().calls, 2);
    }

    #[tokio::test]
    async fn rejection_is_not_retried() {
        let service = Flaky::new(1, ExecutionError::Rejected("unsupported gate".into()));
        let mut adapter = ExecutionAdapter::new(service, SubmissionPolicy::default());
        let (preps, bases) = zeros(2);

        let err = adapter.measure_batch(&preps, &bases).await.unwrap_err();
        assert_eq!(
            err,
            ProtocolError::Execution(ExecutionError::Rejected("unsupported gate".into()))
        );
        assert_eq!(adapter.service().calls, 1);
    }

    #[tokio::test]
    async fn short_result_set_is_an_error() {
        let mut service = Flaky::new(0, ExecutionError::Unavailable(String::new()));
        service.drop_one = true;
        let mut adapter = ExecutionAdapter::new(service, SubmissionPolicy::default());
        let (preps, bases) = zeros(4);

        let err = adapter.measure_batch(&preps, &bases).await.unwrap_err();
        assert_eq!(
            err,
            ProtocolError::Execution(ExecutionError::IncompleteResult { expected: 4, got: 3 })
        );
    }

    #[tokio::test]
    async fn stalled_service_times_out() {
        let policy = SubmissionPolicy {
            max_retries: 0,
            timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let mut adapter = ExecutionAdapter::new(Stalled, policy);
        let (preps, bases) = zeros(1);

        let err = adapter.measure_batch(&preps, &bases).await.unwrap_err();
        assert_eq!(
            err,
            ProtocolError::Execution(ExecutionError::Timeout(Duration::from_millis(50)))
        );
    }

    #[tokio::test]
    async fn uneven_bases_fail_before_submission() {
        let service = Flaky::new(0, ExecutionError::Unavailable(String::new()));
        let mut adapter = ExecutionAdapter::new(service, SubmissionPolicy::default());
        let (preps, _) = zeros(3);

        let err = adapter.measure_batch(&preps, &[Basis::Z]).await.unwrap_err();
        assert!(matches!(err, ProtocolError::LengthMismatch(_)));
        assert_eq!(adapter.service().calls, 0);
    }
}
