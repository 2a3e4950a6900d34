use rand_chacha::ChaChaRng;
use rand_core::{CryptoRng, RngCore, SeedableRng};

const TEST_SEED: [u8; 32] = [
    7, 0, 0, 0, 41, 0, 0, 0, 113, 2, 0, 0, 8, 61, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0,
];

/// Should be used only for tests, not for any real world usage.
#[cfg(not(feature = "std"))]
pub fn test_rng() -> impl RngCore + CryptoRng {
    ChaChaRng::from_seed(TEST_SEED)
}

/// Should be used only for tests, not for any real world usage.
/// Setting `DETERMINISTIC_TEST_RNG=1` makes the rng reproducible.
#[cfg(feature = "std")]
pub fn test_rng() -> impl RngCore + CryptoRng {
    match std::env::var("DETERMINISTIC_TEST_RNG") {
        Ok(val) if val == "1" => ChaChaRng::from_seed(TEST_SEED),
        _ => ChaChaRng::from_entropy(),
    }
}
