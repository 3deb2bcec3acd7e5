//! Text rendering of a whole run as one multi-qubit circuit.
//!
//! Wire `q_i` carries position i: Alice's preparation gates, a barrier for
//! the transmission, Bob's basis change and the final measurement.
//!
//! ```text
//! q_0: ──────░────M─
//! q_1: ─X──H─░─H──M─
//! ```

use std::fmt;

use crate::bb84::QubitProgram;
use crate::bb84_states::Gate;

const EMPTY_CELL: &str = "───";
const BARRIER: &str = "░";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitDiagram {
    wires: Vec<String>,
}

impl CircuitDiagram {
    pub fn from_programs(programs: &[QubitProgram]) -> Self {
        let alice_width = programs.iter().map(|p| p.preparation_len()).max().unwrap_or(0);
        let bob_width = programs
            .iter()
            .map(|p| p.unitary_gates().len().saturating_sub(p.preparation_len()))
            .max()
            .unwrap_or(0);
        let label_width = programs.len().saturating_sub(1).to_string().len();

        let wires = programs
            .iter()
            .enumerate()
            .map(|(i, program)| {
                let unitary = program.unitary_gates();
                let (alice, bob) = unitary.split_at(program.preparation_len().min(unitary.len()));
                let mut wire = format!("q_{:<width$}: ", i, width = label_width);
                push_cells(&mut wire, alice, alice_width);
                wire.push_str(BARRIER);
                push_cells(&mut wire, bob, bob_width);
                if program.gates().last() == Some(&Gate::Measure) {
                    wire.push_str(&cell(Gate::Measure));
                }
                wire
            })
            .collect();

        Self { wires }
    }

    pub fn wires(&self) -> &[String] {
        &self.wires
    }
}

fn cell(gate: Gate) -> String {
    format!("─{}─", gate.label())
}

fn push_cells(wire: &mut String, gates: &[Gate], width: usize) {
    for gate in gates {
        wire.push_str(&cell(*gate));
    }
    for _ in gates.len()..width {
        wire.push_str(EMPTY_CELL);
    }
}

impl fmt::Display for CircuitDiagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for wire in &self.wires {
            writeln!(f, "{}", wire)?;
        }
        Ok(())
    }
}
