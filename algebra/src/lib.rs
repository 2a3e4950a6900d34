//! Field arithmetic used by the Placeholder proof system.
//!
//! The crate wraps the arkworks scalar field of BLS12-381 behind the [`traits::Scalar`]
//! and [`traits::Domain`] traits so that the protocol crates stay generic over the field.
#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unused_import_braces, non_shorthand_field_patterns)]
#![deny(unused_attributes, unused_mut, unused_allocation)]
#![deny(unused_comparisons, bare_trait_objects, unused_must_use)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::upper_case_acronyms)]

/// Module for the BLS12-381 scalar field.
pub mod bls12_381;
/// Module for error handling.
pub mod errors;
/// Module for the prelude.
pub mod prelude;
/// Module for test rngs.
pub mod rand_helper;
/// Module for serialization of field elements.
pub mod serialization;
/// Module for the field traits.
pub mod traits;
/// Module for byte-level utilities.
pub mod utils;

pub use ark_std::{borrow, fmt, hash, iter, marker, ops, rand, One, UniformRand, Zero};
