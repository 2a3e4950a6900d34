use ark_std::{error, fmt, string::String};
use placeholder_algebra::prelude::AlgebraError;
use placeholder_crypto::errors::CryptoError;

pub(crate) type Result<T> = core::result::Result<T, PlonkError>;

#[derive(Debug, Clone, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum PlonkError {
    /// Algebra error
    Algebra(AlgebraError),
    /// Merkle tree error
    Crypto(CryptoError),
    /// The constraint system or the assignment has the wrong shape.
    MalformedInput(String),
    /// A gate constraint does not vanish on an active row.
    UnsatisfiedGate { gate: usize, row: usize },
    /// Two cells bound by a copy constraint differ.
    UnsatisfiedCopyConstraint(usize),
    /// A lookup input is not part of its table.
    UnsatisfiedLookup { gate: usize, row: usize },
    /// The FRI parameters are inconsistent with the degree bound.
    FriParamsError(String),
    /// Error occurred when prove.
    ProofError,
    /// Error occurred when verify.
    VerificationError,
    /// Division by zero.
    DivisionByZero,
    /// Cannot decode the proof bytes.
    DeserializationError,
    /// The degree of the polynomial is higher than the maximum degree supported.
    DegreeError,
}

impl fmt::Display for PlonkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use PlonkError::*;
        match self {
            Algebra(e) => write!(f, "Algebra: {}", e),
            Crypto(e) => write!(f, "Crypto: {}", e),
            MalformedInput(e) => write!(f, "Malformed input: {}", e),
            UnsatisfiedGate { gate, row } => {
                write!(f, "Gate {} is not satisfied at row {}", gate, row)
            }
            UnsatisfiedCopyConstraint(i) => write!(f, "Copy constraint {} is not satisfied", i),
            UnsatisfiedLookup { gate, row } => {
                write!(f, "Lookup gate {} is not satisfied at row {}", gate, row)
            }
            FriParamsError(e) => write!(f, "FRI params error: {}", e),
            ProofError => f.write_str("Proof error."),
            VerificationError => f.write_str("Verification error."),
            DivisionByZero => f.write_str("Division by zero."),
            DeserializationError => f.write_str("Could not deserialize the proof."),
            DegreeError => f.write_str(
                "The degree of the polynomial is higher than the maximum degree supported.",
            ),
        }
    }
}

impl error::Error for PlonkError {}

impl From<AlgebraError> for PlonkError {
    fn from(e: AlgebraError) -> PlonkError {
        PlonkError::Algebra(e)
    }
}

impl From<CryptoError> for PlonkError {
    fn from(e: CryptoError) -> PlonkError {
        PlonkError::Crypto(e)
    }
}
