mod fr;
pub use fr::BLSScalar;

/// The number of bytes for a scalar value over BLS12-381
pub const BLS12_381_SCALAR_LEN: usize = 32;
