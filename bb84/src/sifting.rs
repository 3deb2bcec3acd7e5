//! Basis reconciliation.
//!
//! Alice and Bob publish their bases and keep only the positions where the
//! bases agree. [`AgreementMask`] is the one predicate for "the bases agree
//! here"; sifting and the mismatch diagnostics both go through it, so the two
//! parties' filtered sequences always line up position for position.

use crate::bb84_states::{Basis, Bit};
use crate::error::LengthMismatchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementMask {
    agree: Vec<bool>,
}

impl AgreementMask {
    pub fn new(bases_a: &[Basis], bases_b: &[Basis]) -> Result<Self, LengthMismatchError> {
        LengthMismatchError::check("basis sequences", bases_a.len(), bases_b.len())?;
        Ok(Self {
            agree: bases_a.iter().zip(bases_b).map(|(a, b)| a == b).collect(),
        })
    }

    /// Length of the unsifted sequences.
    pub fn len(&self) -> usize {
        self.agree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agree.is_empty()
    }

    pub fn agrees_at(&self, index: usize) -> bool {
        self.agree.get(index).copied().unwrap_or(false)
    }

    /// Number of retained positions.
    pub fn retained(&self) -> usize {
        self.agree.iter().filter(|&&a| a).count()
    }

    /// Indices where the bases agree, ascending.
    pub fn matching_positions(&self) -> Vec<usize> {
        self.agree
            .iter()
            .enumerate()
            .filter_map(|(i, &a)| a.then_some(i))
            .collect()
    }

    /// Keep `values[i]` wherever the bases agree, in original order.
    pub fn apply<T: Copy>(&self, values: &[T]) -> Result<Vec<T>, LengthMismatchError> {
        LengthMismatchError::check("sifted sequence", self.agree.len(), values.len())?;
        Ok(values
            .iter()
            .zip(&self.agree)
            .filter_map(|(&v, &keep)| keep.then_some(v))
            .collect())
    }
}

/// Keep `bits[i]` iff `bases_a[i] == bases_b[i]`.
pub fn sift(bases_a: &[Basis], bases_b: &[Basis], bits: &[Bit]) -> Result<Vec<Bit>, LengthMismatchError> {
    AgreementMask::new(bases_a, bases_b)?.apply(bits)
}

/// Both parties' sifted keys. Only built through an [`AgreementMask`], so the
/// two keys always have equal length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiftedKeys {
    alice: Vec<Bit>,
    bob: Vec<Bit>,
}

impl SiftedKeys {
    pub fn new(mask: &AgreementMask, alice_bits: &[Bit], bob_bits: &[Bit]) -> Result<Self, LengthMismatchError> {
        Ok(Self {
            alice: mask.apply(alice_bits)?,
            bob: mask.apply(bob_bits)?,
        })
    }

    pub fn alice(&self) -> &[Bit] {
        &self.alice
    }

    pub fn bob(&self) -> &[Bit] {
        &self.bob
    }

    pub fn len(&self) -> usize {
        self.alice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alice.is_empty()
    }
}
