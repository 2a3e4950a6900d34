//! Placeholder: a PLONK-style proof system whose polynomials are committed with a
//! FRI-based list polynomial commitment.
#![deny(warnings)]
#![allow(clippy::needless_borrow)]
#![allow(clippy::upper_case_acronyms)]

#[macro_use]
extern crate serde_derive;

/// Module for errors.
pub mod errors;
/// Module for the proof system.
pub mod plonk;
/// Module for the polynomial commitment.
pub mod poly_commit;
/// Module for utils.
pub mod utils;
