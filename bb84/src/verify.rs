//! Key agreement check and mismatch diagnostics.

use crate::bb84_states::{Basis, Bit};
use crate::error::LengthMismatchError;
use crate::sifting::{AgreementMask, SiftedKeys};

/// One position where the sifted keys disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MismatchRecord {
    /// Index into the sifted key.
    pub position: usize,
    pub alice: Bit,
    pub bob: Bit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    Match {
        key_length: usize,
    },
    Mismatch {
        key_length: usize,
        positions: Vec<usize>,
        details: Vec<MismatchRecord>,
    },
}

impl VerificationResult {
    pub fn is_match(&self) -> bool {
        matches!(self, VerificationResult::Match { .. })
    }

    pub fn key_length(&self) -> usize {
        match self {
            VerificationResult::Match { key_length } | VerificationResult::Mismatch { key_length, .. } => *key_length,
        }
    }

    pub fn mismatches(&self) -> &[MismatchRecord] {
        match self {
            VerificationResult::Match { .. } => &[],
            VerificationResult::Mismatch { details, .. } => details,
        }
    }

    /// Quantum bit error rate: mismatched fraction of the sifted key.
    pub fn error_rate(&self) -> f64 {
        let len = self.key_length();
        if len == 0 {
            0.0
        } else {
            self.mismatches().len() as f64 / len as f64
        }
    }
}

fn compare(key_a: &[Bit], key_b: &[Bit]) -> VerificationResult {
    let details: Vec<MismatchRecord> = key_a
        .iter()
        .zip(key_b)
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(position, (&alice, &bob))| MismatchRecord { position, alice, bob })
        .collect();

    if details.is_empty() {
        VerificationResult::Match {
            key_length: key_a.len(),
        }
    } else {
        VerificationResult::Mismatch {
            key_length: key_a.len(),
            positions: details.iter().map(|d| d.position).collect(),
            details,
        }
    }
}

/// Compare sifted keys position by position.
pub fn verify(keys: &SiftedKeys) -> VerificationResult {
    compare(keys.alice(), keys.bob())
}

/// Compare two arbitrary keys; unequal lengths are an invariant violation.
pub fn verify_keys(key_a: &[Bit], key_b: &[Bit]) -> Result<VerificationResult, LengthMismatchError> {
    LengthMismatchError::check("sifted keys", key_a.len(), key_b.len())?;
    Ok(compare(key_a, key_b))
}

/// Raw data at the positions where the bases agreed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BasisDiagnostics {
    pub matching_positions: Vec<usize>,
    /// Alice's original bits at those positions.
    pub alice_bits: Vec<Bit>,
    /// Bob's measured bits at those positions.
    pub bob_bits: Vec<Bit>,
}

impl BasisDiagnostics {
    pub fn from_mask(mask: &AgreementMask, alice_bits: &[Bit], bob_bits: &[Bit]) -> Result<Self, LengthMismatchError> {
        Ok(Self {
            matching_positions: mask.matching_positions(),
            alice_bits: mask.apply(alice_bits)?,
            bob_bits: mask.apply(bob_bits)?,
        })
    }
}

pub fn diagnose(
    alice_bases: &[Basis],
    bob_bases: &[Basis],
    alice_bits: &[Bit],
    bob_bits: &[Bit],
) -> Result<BasisDiagnostics, LengthMismatchError> {
    let mask = AgreementMask::new(alice_bases, bob_bases)?;
    BasisDiagnostics::from_mask(&mask, alice_bits, bob_bits)
}

/// Pack a key into bytes, most significant bit first, and hex-encode it.
/// A trailing partial byte is zero-padded on the right.
pub fn key_to_hex(key: &[Bit]) -> String {
    let bytes: Vec<u8> = key
        .chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, bit)| acc | (bit.as_u8() << (7 - i)))
        })
        .collect();
    hex::encode(bytes)
}
