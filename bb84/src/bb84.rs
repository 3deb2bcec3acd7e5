use crate::bb84_states::{Basis, Bit, Gate, MeasurementBasis, QubitPreparation};
use crate::error::LengthMismatchError;

pub fn encode(bit: Bit, basis: Basis) -> QubitPreparation {
    match basis {
        Basis::Z => {
            // Rectilinear basis (|0> and |1>)
            match bit {
                Bit::Zero => QubitPreparation::QubitZero,
                Bit::One => QubitPreparation::QubitOne, // X from |0>
            }
        }
        Basis::X => {
            // Diagonal basis (|+> and |->)
            match bit {
                Bit::Zero => QubitPreparation::QubitPlus, // H from |0>
                Bit::One => QubitPreparation::QubitMinus, // X then H
            }
        }
    }
}

/// Encode a whole sequence of bit/basis pairs.
pub fn encode_all(bits: &[Bit], bases: &[Basis]) -> Result<Vec<QubitPreparation>, LengthMismatchError> {
    LengthMismatchError::check("encoding bases", bits.len(), bases.len())?;
    Ok(bits
        .iter()
        .zip(bases)
        .map(|(&bit, &basis)| encode(bit, basis))
        .collect())
}

/// The outcome a noise-free measurement is certain to give, if any.
///
/// Measuring in the preparation basis reproduces the encoded bit; measuring
/// in the other basis is a fair coin, reported as `None`.
pub fn ideal_outcome(state: QubitPreparation, basis: MeasurementBasis) -> Option<Bit> {
    if state.basis() == basis {
        Some(state.bit())
    } else {
        None
    }
}

/// Gate sequence for one qubit: preparation, optional basis change, measurement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QubitProgram {
    preparation: QubitPreparation,
    measurement_basis: MeasurementBasis,
    gates: Vec<Gate>,
}

impl QubitProgram {
    /// Build the program that prepares `preparation` and reads it in `basis`.
    ///
    /// An X-basis reading applies H before the computational-basis measurement,
    /// undoing the diagonal encoding step.
    pub fn for_measurement(preparation: QubitPreparation, basis: MeasurementBasis) -> Self {
        let mut gates = preparation.gates().to_vec();
        if basis == Basis::X {
            gates.push(Gate::H);
        }
        gates.push(Gate::Measure);
        Self {
            preparation,
            measurement_basis: basis,
            gates,
        }
    }

    pub fn preparation(&self) -> QubitPreparation {
        self.preparation
    }

    pub fn measurement_basis(&self) -> MeasurementBasis {
        self.measurement_basis
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Gates before the final measurement.
    pub fn unitary_gates(&self) -> &[Gate] {
        let end = self
            .gates
            .iter()
            .position(|g| *g == Gate::Measure)
            .unwrap_or(self.gates.len());
        &self.gates[..end]
    }

    /// Split point between Alice's preparation and Bob's basis change.
    pub fn preparation_len(&self) -> usize {
        self.preparation.gates().len()
    }
}

/// Pair each preparation with the measuring party's basis.
pub fn measurement_programs(
    preparations: &[QubitPreparation],
    bases: &[MeasurementBasis],
) -> Result<Vec<QubitProgram>, LengthMismatchError> {
    LengthMismatchError::check("measurement bases", preparations.len(), bases.len())?;
    Ok(preparations
        .iter()
        .zip(bases)
        .map(|(&prep, &basis)| QubitProgram::for_measurement(prep, basis))
        .collect())
}
