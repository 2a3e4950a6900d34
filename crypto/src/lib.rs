//! The crate implements the hash-based primitives of the Placeholder proof system,
//! namely the binary Merkle tree used to commit to polynomial evaluations.
#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unused_import_braces, non_shorthand_field_patterns)]
#![deny(unused_attributes, unused_mut, unused_allocation)]
#![deny(unused_comparisons, bare_trait_objects, unused_must_use)]
#![deny(missing_docs)]
#![forbid(unsafe_code)]

#[macro_use]
extern crate serde_derive;

/// Module for error handling.
pub mod errors;
/// The module for the binary Merkle tree.
pub mod merkle_tree;
