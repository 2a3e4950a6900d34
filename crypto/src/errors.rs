use ark_std::{error, fmt};

pub(crate) type Result<T> = core::result::Result<T, CryptoError>;

#[derive(Debug, Clone, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum CryptoError {
    /// The number of leaves is zero or not a power of two.
    LeavesNotPowerOfTwo(usize),
    /// The requested leaf does not exist.
    IndexOutOfRange { index: usize, max: usize },
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CryptoError::*;
        match self {
            LeavesNotPowerOfTwo(n) => {
                write!(f, "The number of leaves {} is not a power of two", n)
            }
            IndexOutOfRange { index, max } => {
                write!(f, "Leaf index {} is out of range, maximum is {}", index, max)
            }
        }
    }
}

impl error::Error for CryptoError {}
