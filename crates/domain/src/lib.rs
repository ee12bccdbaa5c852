//! Domain layer for the chaos injector
//!
//! Contains the value objects the interception engine reasons about
//! (probabilities, member names, member shapes) and domain errors.
//! This layer has no I/O and defines the ubiquitous language.

pub mod errors;
pub mod value_objects;

pub use errors::DomainError;
pub use value_objects::*;
