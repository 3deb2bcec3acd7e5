//! Reduction of backend histograms to one bit per qubit.

use crate::bb84_states::Bit;
use crate::error::InterpretationError;
use crate::execution::RawOutcome;

/// How a histogram is reduced to a single bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutcomeReduction {
    /// Exactly one shot with one definite label.
    #[default]
    SingleShot,
    /// Most frequent label; ties are ambiguous.
    Majority,
}

fn parse_label(index: usize, label: &str) -> Result<Bit, InterpretationError> {
    match label {
        "0" => Ok(Bit::Zero),
        "1" => Ok(Bit::One),
        _ => Err(InterpretationError::UnrecognisedLabel {
            index,
            label: label.to_string(),
        }),
    }
}

/// Reduce the outcome of qubit `index`.
pub fn interpret_one(
    index: usize,
    outcome: &RawOutcome,
    reduction: OutcomeReduction,
) -> Result<Bit, InterpretationError> {
    let observed: Vec<(&String, usize)> = outcome
        .counts()
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(label, &count)| (label, count))
        .collect();

    if observed.is_empty() {
        return Err(InterpretationError::Empty { index });
    }

    match reduction {
        OutcomeReduction::SingleShot => {
            if observed.len() > 1 {
                return Err(InterpretationError::Ambiguous {
                    index,
                    labels: observed.iter().map(|(l, _)| l.to_string()).collect(),
                });
            }
            let (label, shots) = observed[0];
            if shots != 1 {
                return Err(InterpretationError::ShotCount { index, shots });
            }
            parse_label(index, label)
        }
        OutcomeReduction::Majority => {
            let best = observed.iter().map(|(_, c)| *c).max().unwrap_or(0);
            let leaders: Vec<&String> = observed
                .iter()
                .filter(|(_, c)| *c == best)
                .map(|(l, _)| *l)
                .collect();
            match leaders.as_slice() {
                [label] => parse_label(index, label),
                _ => Err(InterpretationError::Ambiguous {
                    index,
                    labels: leaders.iter().map(|l| l.to_string()).collect(),
                }),
            }
        }
    }
}

/// Project raw outcomes onto measured bits, preserving order.
pub fn interpret(raw_outcomes: &[RawOutcome], reduction: OutcomeReduction) -> Result<Vec<Bit>, InterpretationError> {
    raw_outcomes
        .iter()
        .enumerate()
        .map(|(i, outcome)| interpret_one(i, outcome, reduction))
        .collect()
}
