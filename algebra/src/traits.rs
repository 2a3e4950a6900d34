use crate::prelude::*;
use ark_ff::FftField;
use ark_std::{fmt::Debug, hash::Hash};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// The trait for scalars
pub trait Scalar:
    Copy
    + Default
    + Debug
    + PartialEq
    + Eq
    + Hash
    + Ord
    + Serialize
    + for<'de> Deserialize<'de>
    + Into<BigUint>
    + Clone
    + One
    + Zero
    + Sized
    + Add<Self, Output = Self>
    + Sub<Self, Output = Self>
    + Mul<Self, Output = Self>
    + Sum<Self>
    + for<'a> Add<&'a Self, Output = Self>
    + for<'a> AddAssign<&'a Self>
    + for<'a> Mul<&'a Self, Output = Self>
    + for<'a> MulAssign<&'a Self>
    + for<'a> Sub<&'a Self, Output = Self>
    + for<'a> SubAssign<&'a Self>
    + for<'a> Sum<&'a Self>
    + From<u32>
    + From<u64>
    + Neg<Output = Self>
    + Sync
    + Send
{
    /// Return a random scalar
    fn random<R: CryptoRng + RngCore>(rng: &mut R) -> Self;

    /// Return multiplicative generator of the group of units,
    /// it is also a quadratic nonresidue
    fn multiplicative_generator() -> Self;

    /// Return the largest `k` such that `2^k` divides `field_size - 1`
    fn two_adicity() -> u32;

    /// Return the little-endian byte representations of the field size
    fn get_field_size_le_bytes() -> Vec<u8>;

    /// Return the field size as a BigUint
    fn get_field_size_biguint() -> BigUint {
        BigUint::from_bytes_le(&Self::get_field_size_le_bytes())
    }

    /// Return a representation of the scalar as a vector of u64 in the little-endian order
    fn get_little_endian_u64(&self) -> Vec<u64>;

    /// Return the len of the byte representation
    fn bytes_len() -> usize;

    /// Convert to bytes
    fn to_bytes(&self) -> Vec<u8>;

    /// Convert from bytes, rejecting non-canonical encodings
    fn from_bytes(bytes: &[u8]) -> Result<Self>;

    /// Return the modular inverse of the scalar if it exists
    fn inv(&self) -> Result<Self>;

    /// Return the square of the field element
    fn square(&self) -> Self;

    /// exponent form: least significant limb first, with u64 limbs
    fn pow(&self, exponent: &[u64]) -> Self {
        let mut base = *self;
        let mut result = Self::one();
        for exp_u64 in exponent {
            let mut e = *exp_u64;
            for _ in 0..64 {
                if e & 1 == 1 {
                    result.mul_assign(&base);
                }
                base = base.mul(&base);
                e >>= 1;
            }
        }
        result
    }

    /// Convert into BigUint, often for debug.
    fn into_biguint(self) -> BigUint {
        self.into()
    }
}

/// The trait for scalars that can be used in FFTs.
pub trait Domain: Scalar {
    /// The arkworks field that is able to be used in FFTs.
    type Field: FftField;

    /// Return the arkworks field element.
    fn get_field(&self) -> Self::Field;

    /// Wrap an arkworks field element.
    fn from_field(field: Self::Field) -> Self;
}
