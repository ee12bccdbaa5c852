//! Probability value object
//!
//! Represents the chance (0.0-1.0 inclusive) that a member access is served by
//! the real implementation.
//!
//! # Examples
//!
//! ```
//! use domain::value_objects::Probability;
//!
//! let p = Probability::new(0.25).expect("valid probability");
//! assert!((p.value() - 0.25).abs() < f64::EPSILON);
//!
//! // Out-of-range and NaN values are rejected
//! assert!(Probability::new(1.5).is_err());
//! assert!(Probability::new(f64::NAN).is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

/// Probability in the closed interval [0, 1]
///
/// A draw `r` from [0, 1) "hits" this probability when `r < value`, so
/// `Probability::NEVER` never hits and `Probability::ALWAYS` always hits.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Probability(f64);

impl Probability {
    /// Probability that never hits
    pub const NEVER: Self = Self(0.0);

    /// Probability that always hits
    pub const ALWAYS: Self = Self(1.0);

    /// Create a new validated probability
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidProbability` if the value is NaN or outside [0, 1].
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if Self::is_valid(value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidProbability { value })
        }
    }

    /// Check whether a raw value would make a valid probability
    #[must_use]
    pub fn is_valid(value: f64) -> bool {
        (0.0..=1.0).contains(&value)
    }

    /// Get the raw value
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Whether a uniform draw from [0, 1) falls below this probability
    #[must_use]
    pub fn admits(self, draw: f64) -> bool {
        draw < self.0
    }
}

impl Default for Probability {
    fn default() -> Self {
        Self(0.5)
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for Probability {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Probability> for f64 {
    fn from(p: Probability) -> Self {
        p.0
    }
}

/// Custom deserialization that validates the range
impl<'de> Deserialize<'de> for Probability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}
