//! Random source port
//!
//! Defines the uniform random draw the decision function consumes. Adapters in
//! the infrastructure layer provide thread-local, seeded and scripted sources;
//! tests substitute deterministic implementations.

#[cfg(test)]
use mockall::automock;

/// Source of uniform random draws in [0, 1)
///
/// Every probabilistic decision consumes exactly one draw. Implementations
/// must be safe to share between interceptors.
#[cfg_attr(test, automock)]
pub trait RandomSource: Send + Sync {
    /// Draw the next value from [0, 1)
    fn next_f64(&self) -> f64;
}
