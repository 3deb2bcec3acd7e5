use std::fmt;

use crate::circuit::CircuitDiagram;
use crate::protocol::ProtocolRecord;
use crate::verify::{key_to_hex, VerificationResult};

/// Terminal rendering of a finished run.
#[derive(Debug, Clone)]
pub struct ProtocolReport {
    record: ProtocolRecord,
    circuit: Option<CircuitDiagram>,
}

impl ProtocolReport {
    pub fn new(record: ProtocolRecord) -> Self {
        Self { record, circuit: None }
    }

    /// Append the combined circuit diagram to the report.
    pub fn with_circuit(mut self) -> Self {
        self.circuit = Some(CircuitDiagram::from_programs(&self.record.programs));
        self
    }

    pub fn record(&self) -> &ProtocolRecord {
        &self.record
    }
}

/// `[a, b, c]` using each item's `Display`.
fn list<T: fmt::Display>(items: &[T]) -> String {
    let inner: Vec<String> = items.iter().map(|i| i.to_string()).collect();
    format!("[{}]", inner.join(", "))
}

impl fmt::Display for ProtocolReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.record;
        writeln!(f, "Alice's bits: {}", list(&r.alice.bits))?;
        writeln!(f, "Alice's bases: {}", list(&r.alice.bases))?;
        writeln!(f, "Bob's bases: {}", list(&r.bob_bases))?;
        writeln!(f, "Bob's results: {}", list(&r.bob_bits))?;
        writeln!(f, "Alice's key: {}", list(r.keys.alice()))?;
        writeln!(f, "Bob's key: {}", list(r.keys.bob()))?;

        match &r.verification {
            VerificationResult::Match { .. } => {
                writeln!(f, "Success: Alice and Bob's keys match!")?;
            }
            VerificationResult::Mismatch { details, .. } => {
                writeln!(f, "Warning: Alice and Bob's keys do not match.")?;
                writeln!(f, "Mismatched positions:")?;
                for d in details {
                    writeln!(f, "Position {}: Alice has {}, Bob has {}", d.position, d.alice, d.bob)?;
                }
                writeln!(f)?;
                writeln!(f, "Detailed analysis:")?;
                writeln!(f, "Matching bases positions: {}", list(&r.diagnostics.matching_positions))?;
                writeln!(f, "Alice's bits at matching bases: {}", list(&r.diagnostics.alice_bits))?;
                writeln!(f, "Bob's measured bits at matching bases: {}", list(&r.diagnostics.bob_bits))?;
            }
        }

        writeln!(
            f,
            "QBER: {:.2}% ({} of {} sifted bits)",
            r.verification.error_rate() * 100.0,
            r.verification.mismatches().len(),
            r.verification.key_length()
        )?;
        if r.verification.is_match() && !r.keys.is_empty() {
            writeln!(f, "Shared key (hex): {}", key_to_hex(r.keys.alice()))?;
        }

        if let Some(circuit) = &self.circuit {
            writeln!(f)?;
            write!(f, "{}", circuit)?;
        }
        Ok(())
    }
}
