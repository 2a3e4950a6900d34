use crate::bls12_381::BLS12_381_SCALAR_LEN;
use crate::prelude::*;
use ark_bls12_381::Fr;
use ark_ff::{BigInteger, FftField, Field, PrimeField};
use ark_serialize::CanonicalDeserialize;
use ark_std::{
    fmt::{Debug, Formatter},
    result::Result as StdResult,
    str::FromStr,
};
use num_bigint::BigUint;

/// The wrapped struct for `ark_bls12_381::Fr`
#[derive(Copy, Clone, PartialEq, Eq, Default, PartialOrd, Ord, Hash)]
pub struct BLSScalar(pub(crate) Fr);

impl Debug for BLSScalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> ark_std::fmt::Result {
        let v: BigUint = self.0.into();
        <BigUint as Debug>::fmt(&v, f)
    }
}

impl FromStr for BLSScalar {
    type Err = AlgebraError;

    fn from_str(string: &str) -> StdResult<Self, AlgebraError> {
        Fr::from_str(string)
            .map(Self)
            .map_err(|_| AlgebraError::DeserializationError)
    }
}

impl From<BLSScalar> for BigUint {
    #[inline]
    fn from(value: BLSScalar) -> BigUint {
        value.0.into()
    }
}

impl One for BLSScalar {
    #[inline]
    fn one() -> Self {
        Self(Fr::one())
    }
}

impl Zero for BLSScalar {
    #[inline]
    fn zero() -> Self {
        Self(Fr::zero())
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Add for BLSScalar {
    type Output = BLSScalar;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for BLSScalar {
    type Output = BLSScalar;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul for BLSScalar {
    type Output = BLSScalar;

    #[inline]
    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl<'a> Add<&'a BLSScalar> for BLSScalar {
    type Output = BLSScalar;

    #[inline]
    fn add(self, rhs: &Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl<'a> AddAssign<&'a BLSScalar> for BLSScalar {
    #[inline]
    fn add_assign(&mut self, rhs: &Self) {
        self.0 += rhs.0;
    }
}

impl<'a> Sub<&'a BLSScalar> for BLSScalar {
    type Output = BLSScalar;

    #[inline]
    fn sub(self, rhs: &Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl<'a> SubAssign<&'a BLSScalar> for BLSScalar {
    #[inline]
    fn sub_assign(&mut self, rhs: &Self) {
        self.0 -= rhs.0;
    }
}

impl<'a> Mul<&'a BLSScalar> for BLSScalar {
    type Output = BLSScalar;

    #[inline]
    fn mul(self, rhs: &Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl<'a> MulAssign<&'a BLSScalar> for BLSScalar {
    #[inline]
    fn mul_assign(&mut self, rhs: &Self) {
        self.0 *= rhs.0;
    }
}

impl Sum<BLSScalar> for BLSScalar {
    #[inline]
    fn sum<I: Iterator<Item = BLSScalar>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl<'a> Sum<&'a BLSScalar> for BLSScalar {
    #[inline]
    fn sum<I: Iterator<Item = &'a BLSScalar>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl Neg for BLSScalar {
    type Output = BLSScalar;

    #[inline]
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl From<u32> for BLSScalar {
    #[inline]
    fn from(value: u32) -> Self {
        Self::from(value as u64)
    }
}

impl From<u64> for BLSScalar {
    #[inline]
    fn from(value: u64) -> Self {
        Self(Fr::from(value))
    }
}

impl Scalar for BLSScalar {
    #[inline]
    fn random<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        Self(Fr::rand(rng))
    }

    #[inline]
    fn multiplicative_generator() -> Self {
        Self(Fr::GENERATOR)
    }

    #[inline]
    fn two_adicity() -> u32 {
        <Fr as FftField>::TWO_ADICITY
    }

    #[inline]
    fn get_field_size_le_bytes() -> Vec<u8> {
        Fr::MODULUS.to_bytes_le()
    }

    #[inline]
    fn get_little_endian_u64(&self) -> Vec<u64> {
        self.0.into_bigint().0.to_vec()
    }

    #[inline]
    fn bytes_len() -> usize {
        BLS12_381_SCALAR_LEN
    }

    #[inline]
    fn to_bytes(&self) -> Vec<u8> {
        self.0.into_bigint().to_bytes_le()
    }

    #[inline]
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::bytes_len() {
            return Err(AlgebraError::DeserializationError);
        }
        Fr::deserialize_compressed(bytes)
            .map(Self)
            .map_err(|_| AlgebraError::DeserializationError)
    }

    #[inline]
    fn inv(&self) -> Result<Self> {
        self.0
            .inverse()
            .map(Self)
            .ok_or(AlgebraError::GroupInversionError)
    }

    #[inline]
    fn square(&self) -> Self {
        Self(self.0.square())
    }

    #[inline]
    fn pow(&self, exponent: &[u64]) -> Self {
        Self(self.0.pow(exponent))
    }
}

impl Domain for BLSScalar {
    type Field = Fr;

    #[inline]
    fn get_field(&self) -> Self::Field {
        self.0
    }

    #[inline]
    fn from_field(field: Self::Field) -> Self {
        Self(field)
    }
}

#[cfg(test)]
mod test {
    use crate::bls12_381::BLSScalar;
    use crate::prelude::*;
    use ark_std::str::FromStr;
    use num_bigint::BigUint;

    #[test]
    fn test_arithmetic() {
        let mut prng = test_rng();
        let a = BLSScalar::random(&mut prng);
        let b = BLSScalar::random(&mut prng);

        assert_eq!(a + b - b, a);
        assert_eq!(a * b, b * a);
        assert_eq!(a + (-a), BLSScalar::zero());
        assert_eq!(a.square(), a * a);
        assert_eq!(a.pow(&[3]), a * a * a);
        assert_eq!(a * a.inv().unwrap(), BLSScalar::one());
        assert!(BLSScalar::zero().inv().is_err());

        let sum: BLSScalar = [a, b, BLSScalar::one()].iter().sum();
        assert_eq!(sum, a + b + BLSScalar::one());
    }

    #[test]
    fn test_bytes() {
        let mut prng = test_rng();
        let a = BLSScalar::random(&mut prng);
        let bytes = a.to_bytes();
        assert_eq!(bytes.len(), BLSScalar::bytes_len());
        assert_eq!(BLSScalar::from_bytes(&bytes).unwrap(), a);

        // the modulus itself is not a canonical encoding
        let modulus = BLSScalar::get_field_size_le_bytes();
        assert!(BLSScalar::from_bytes(&modulus).is_err());
        assert!(BLSScalar::from_bytes(&bytes[..31]).is_err());
    }

    #[test]
    fn test_field_constants() {
        let minus_one = -BLSScalar::one();
        let expected: BigUint = BLSScalar::get_field_size_biguint() - 1u64;
        assert_eq!(minus_one.into_biguint(), expected);

        // the generator has full order, so it is not a square
        let g = BLSScalar::multiplicative_generator();
        let half: BigUint = (BLSScalar::get_field_size_biguint() - 1u64) >> 1;
        let half_limbs = half.to_u64_digits();
        assert_eq!(g.pow(&half_limbs), minus_one);

        let two_adic = BLSScalar::get_field_size_biguint() - 1u64;
        assert_eq!(
            two_adic.trailing_zeros(),
            Some(BLSScalar::two_adicity() as u64)
        );

        assert_eq!(BLSScalar::from_str("7").unwrap(), BLSScalar::from(7u32));
    }

    #[test]
    fn test_serde() {
        let mut prng = test_rng();
        let a = BLSScalar::random(&mut prng);

        let json = serde_json::to_string(&a).unwrap();
        let a_json: BLSScalar = serde_json::from_str(&json).unwrap();
        assert_eq!(a, a_json);

        let bin = bincode::serialize(&a).unwrap();
        let a_bin: BLSScalar = bincode::deserialize(&bin).unwrap();
        assert_eq!(a, a_bin);
    }
}
