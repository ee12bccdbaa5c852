//! Application layer - Chaos injection use cases
//!
//! Turns validated chaos policies into decision functions and installs them on
//! target objects. Randomness is consumed through the [`RandomSource`] port;
//! infrastructure adapters provide the implementations.

pub mod error;
pub mod ports;
pub mod services;

pub use error::{ApplicationError, WrapError};
pub use ports::*;
pub use services::*;
