use async_trait::async_trait;

use crate::prelude::*;

/// Answers every program with a fixed set of histograms, ignoring the qubits.
struct Scripted {
    outcomes: Vec<OutcomeHistogram>,
}

#[async_trait]
impl QuantumExecutionService for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn execute(&mut self, _request: ExecutionRequest) -> Result<ExecutionResponse, ExecutionError> {
        Ok(ExecutionResponse {
            outcomes: self.outcomes.clone(),
        })
    }
}

/// Always unreachable.
struct Offline;

#[async_trait]
impl QuantumExecutionService for Offline {
    fn name(&self) -> &str {
        "offline"
    }

    async fn execute(&mut self, _request: ExecutionRequest) -> Result<ExecutionResponse, ExecutionError> {
        Err(ExecutionError::Unavailable("connection refused".to_string()))
    }
}

fn bits(values: &[u8]) -> Vec<Bit> {
    values.iter().map(|&v| Bit::from(v == 1)).collect()
}

fn bases(values: &[u8]) -> Vec<Basis> {
    values
        .iter()
        .map(|&v| if v == 1 { Basis::X } else { Basis::Z })
        .collect()
}

fn scenario_choices() -> (PartyChoices, Vec<Basis>) {
    (
        PartyChoices::new(bits(&[0, 1, 1, 0]), bases(&[0, 1, 0, 1])),
        bases(&[0, 0, 0, 1]),
    )
}

#[tokio::test]
async fn four_qubit_scenario_matches() {
    let (alice, bob_bases) = scenario_choices();
    let mut protocol = Protocol::local(ProtocolConfig::default().with_seed(0)).unwrap();
    let record = protocol.run_with_choices(alice, bob_bases).await.unwrap();

    assert_eq!(record.diagnostics.matching_positions, vec![0, 2, 3]);
    assert_eq!(record.keys.alice(), bits(&[0, 1, 0]).as_slice());
    assert_eq!(record.keys.bob(), bits(&[0, 1, 0]).as_slice());
    assert_eq!(record.verification, VerificationResult::Match { key_length: 3 });
}

#[tokio::test]
async fn ideal_measurement_reproduces_bits_in_matching_basis() {
    for seed in 0..25 {
        let config = ProtocolConfig::default().with_length(64).with_seed(seed);
        let record = Protocol::local(config).unwrap().run().await.unwrap();

        for i in 0..record.len() {
            if record.alice.bases[i] == record.bob_bases[i] {
                assert_eq!(record.bob_bits[i], record.alice.bits[i], "seed {} position {}", seed, i);
            }
        }
        assert!(record.verification.is_match());
    }
}

#[tokio::test]
async fn sifted_key_length_equals_agreement_count() {
    let config = ProtocolConfig::default().with_length(200).with_seed(77);
    let record = Protocol::local(config).unwrap().run().await.unwrap();
    let agreements = record
        .alice
        .bases
        .iter()
        .zip(&record.bob_bases)
        .filter(|(a, b)| a == b)
        .count();
    assert_eq!(record.keys.len(), agreements);
    assert_eq!(record.diagnostics.matching_positions.len(), agreements);
}

#[tokio::test]
async fn faulty_backend_produces_complete_mismatch_report() {
    let (alice, bob_bases) = scenario_choices();
    // Bob "reads" 1, 1, 0, 0: wrong at original positions 0 and 2.
    let outcomes = ["1", "1", "0", "0"].iter().map(|&l| OutcomeHistogram::single(l)).collect();
    let mut protocol = Protocol::new(ProtocolConfig::default(), Scripted { outcomes }).unwrap();
    let record = protocol.run_with_choices(alice, bob_bases).await.unwrap();

    match &record.verification {
        VerificationResult::Mismatch { positions, details, key_length } => {
            assert_eq!(*key_length, 3);
            assert_eq!(positions, &vec![0, 1]);
            assert_eq!(details[0], MismatchRecord { position: 0, alice: Bit::Zero, bob: Bit::One });
            assert_eq!(details[1], MismatchRecord { position: 1, alice: Bit::One, bob: Bit::Zero });
        }
        other => panic!("expected mismatch, got {:?}", other),
    }
    assert_eq!(record.diagnostics.bob_bits, bits(&[1, 0, 0]));
    assert_eq!(record.stage, Stage::Verified);

    let text = record.report().to_string();
    assert!(text.contains("Warning: Alice and Bob's keys do not match."));
    assert!(text.contains("Position 0: Alice has 0, Bob has 1"));
    assert!(text.contains("Position 1: Alice has 1, Bob has 0"));
    assert!(text.contains("Matching bases positions: [0, 2, 3]"));
    assert!(text.contains("Alice's bits at matching bases: [0, 1, 0]"));
    assert!(text.contains("Bob's measured bits at matching bases: [1, 0, 0]"));
}

#[tokio::test]
async fn short_result_set_aborts_without_key() {
    let (alice, bob_bases) = scenario_choices();
    let outcomes = vec![OutcomeHistogram::single("0"); 3];
    let mut protocol = Protocol::new(ProtocolConfig::default(), Scripted { outcomes }).unwrap();

    let err = protocol.run_with_choices(alice, bob_bases).await.unwrap_err();
    assert_eq!(
        err,
        ProtocolError::Execution(ExecutionError::IncompleteResult { expected: 4, got: 3 })
    );
}

#[tokio::test]
async fn ambiguous_outcome_aborts() {
    let (alice, bob_bases) = scenario_choices();
    let mut outcomes = vec![OutcomeHistogram::single("0"); 4];
    outcomes[2] = vec![("0", 1), ("1", 1)].into_iter().collect();
    let mut protocol = Protocol::new(ProtocolConfig::default(), Scripted { outcomes }).unwrap();

    let err = protocol.run_with_choices(alice, bob_bases).await.unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::Interpretation(InterpretationError::Ambiguous { index: 2, .. })
    ));
}

#[tokio::test]
async fn unreachable_service_exhausts_retries() {
    let config = ProtocolConfig::default().with_seed(3);
    let mut protocol = Protocol::new(config, Offline).unwrap();
    let err = protocol.run().await.unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::Execution(ExecutionError::RetriesExhausted { attempts: 3, .. })
    ));
}

#[tokio::test]
async fn strong_bit_flip_noise_shows_up_as_mismatch() {
    let config = ProtocolConfig::default()
        .with_length(64)
        .with_seed(5)
        .with_noise(NoiseChannel::BitFlip { p: 1.0 });
    let record = Protocol::local(config).unwrap().run().await.unwrap();

    // Every Z-basis agreement is flipped.
    let z_agreements = record
        .alice
        .bases
        .iter()
        .zip(&record.bob_bases)
        .filter(|(a, b)| a == b && **a == Basis::Z)
        .count();
    assert!(z_agreements > 0);
    assert!(!record.verification.is_match());
    assert!(record.verification.mismatches().len() >= z_agreements);
}

#[tokio::test]
async fn majority_reduction_over_many_shots() {
    let config = ProtocolConfig::default()
        .with_length(16)
        .with_seed(8)
        .with_shots(9, OutcomeReduction::Majority);
    let record = Protocol::local(config).unwrap().run().await.unwrap();

    assert!(record.raw_outcomes.iter().all(|h| h.total_shots() == 9));
    assert!(record.verification.is_match());
}

#[tokio::test]
async fn zero_length_run_is_trivially_matching() {
    let config = ProtocolConfig::default().with_length(0).with_seed(4);
    let record = Protocol::local(config).unwrap().run().await.unwrap();
    assert!(record.is_empty());
    assert!(record.keys.is_empty());
    assert!(record.verification.is_match());
}

#[tokio::test]
async fn success_report_lists_sequences_in_order() {
    let (alice, bob_bases) = scenario_choices();
    let mut protocol = Protocol::local(ProtocolConfig::default().with_seed(0)).unwrap();
    let record = protocol.run_with_choices(alice, bob_bases).await.unwrap();
    let text = record.report().with_circuit().to_string();

    let order = [
        "Alice's bits: [0, 1, 1, 0]",
        "Alice's bases: [Z, X, Z, X]",
        "Bob's bases: [Z, Z, Z, X]",
        "Bob's results: ",
        "Alice's key: [0, 1, 0]",
        "Bob's key: [0, 1, 0]",
        "Success: Alice and Bob's keys match!",
        "QBER: 0.00% (0 of 3 sifted bits)",
        "Shared key (hex): 40",
        "q_0: ",
    ];
    let mut cursor = 0;
    for line in order {
        let found = text[cursor..]
            .find(line)
            .unwrap_or_else(|| panic!("{:?} missing or out of order in\n{}", line, text));
        cursor += found + line.len();
    }
    assert!(!text.contains("Mismatched positions"));
}
