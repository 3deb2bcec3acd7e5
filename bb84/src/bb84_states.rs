use rand::distributions::{Distribution, Standard};
use rand::Rng;
use std::fmt;

/// A classical bit, either chosen by Alice or measured by Bob.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bit {
    Zero,
    One,
}

impl Bit {
    pub fn as_u8(self) -> u8 {
        match self {
            Bit::Zero => 0,
            Bit::One => 1,
        }
    }

    pub fn flipped(self) -> Bit {
        match self {
            Bit::Zero => Bit::One,
            Bit::One => Bit::Zero,
        }
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value {
            Bit::One
        } else {
            Bit::Zero
        }
    }
}

impl From<Bit> for bool {
    fn from(bit: Bit) -> Self {
        bit == Bit::One
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl Distribution<Bit> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Bit {
        Bit::from(rng.gen::<bool>())
    }
}

/// Preparation / measurement basis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Basis {
    /// Rectilinear basis (|0> and |1>)
    Z,
    /// Diagonal basis (|+> and |->)
    X,
}

/// The basis a receiving party measures in.
pub type MeasurementBasis = Basis;

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Basis::Z => write!(f, "Z"),
            Basis::X => write!(f, "X"),
        }
    }
}

impl Distribution<Basis> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Basis {
        if rng.gen::<bool>() {
            Basis::X
        } else {
            Basis::Z
        }
    }
}

/// Single-qubit gates understood by an execution service.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Pauli X (bit flip)
    X,
    /// Hadamard
    H,
    /// Projective measurement in the computational basis
    Measure,
}

impl Gate {
    pub fn label(&self) -> &'static str {
        match self {
            Gate::X => "X",
            Gate::H => "H",
            Gate::Measure => "M",
        }
    }
}

/// Descriptor of the single-qubit state Alice prepares.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum QubitPreparation {
    QubitZero,
    QubitOne,
    QubitPlus,  // Represents the |+> state
    QubitMinus, // Represents the |-> state
}

impl QubitPreparation {
    /// Gates that take |0> to this state.
    pub fn gates(&self) -> &'static [Gate] {
        match self {
            QubitPreparation::QubitZero => &[],
            QubitPreparation::QubitOne => &[Gate::X],
            QubitPreparation::QubitPlus => &[Gate::H],
            QubitPreparation::QubitMinus => &[Gate::X, Gate::H],
        }
    }

    pub fn basis(&self) -> Basis {
        match self {
            QubitPreparation::QubitZero | QubitPreparation::QubitOne => Basis::Z,
            QubitPreparation::QubitPlus | QubitPreparation::QubitMinus => Basis::X,
        }
    }

    /// The bit this state carries when read in its own basis.
    pub fn bit(&self) -> Bit {
        match self {
            QubitPreparation::QubitZero | QubitPreparation::QubitPlus => Bit::Zero,
            QubitPreparation::QubitOne | QubitPreparation::QubitMinus => Bit::One,
        }
    }

    pub fn ket(&self) -> &'static str {
        match self {
            QubitPreparation::QubitZero => "|0⟩",
            QubitPreparation::QubitOne => "|1⟩",
            QubitPreparation::QubitPlus => "|+⟩",
            QubitPreparation::QubitMinus => "|−⟩",
        }
    }
}

impl fmt::Display for QubitPreparation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ket())
    }
}
