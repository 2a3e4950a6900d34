//! The Placeholder proof system.

/// Module for help functions.
pub(crate) mod helpers;

/// Module for the constraint system.
pub mod constraint_system;

/// Module for the gate argument.
pub(crate) mod gates;

/// Module for the lookup argument.
pub(crate) mod lookup;

/// Module for the permutation argument.
pub(crate) mod permutation;

/// Module for preprocessing.
pub mod preprocessor;

/// Module for the proof.
pub mod proof;

/// Module for prover.
pub mod prover;

/// Module for transcript.
pub mod transcript;

/// Module for verifier.
pub mod verifier;


pub use helpers::{PointEvaluator, PolyLayout, PolyRef};
