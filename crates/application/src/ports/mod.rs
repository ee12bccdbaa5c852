//! Ports - Interfaces for external dependencies
//!
//! The application layer depends only on these traits; infrastructure
//! provides the adapters.

mod random_source;

pub use random_source::RandomSource;
#[cfg(test)]
pub use random_source::MockRandomSource;
