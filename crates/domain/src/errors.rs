//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainError {
    /// Probability outside [0, 1] (or NaN)
    #[error("Invalid probability: {value} (must be between 0 and 1)")]
    InvalidProbability { value: f64 },

    /// Member name that cannot address a member
    #[error("Invalid member name: '{0}'")]
    InvalidMemberName(String),
}
