/// Module for field polynomial.
pub mod field_polynomial;

/// Module for the FRI low-degree test and Merkle-committed polynomial batches.
pub mod fri;

/// Module for the list polynomial commitment built on FRI.
pub mod lpc;

/// Module for polynomial commitment transcript.
pub mod transcript;
