//! Tracing subscriber setup
//!
//! Console logging for chaos runs: an `EnvFilter` plus a fmt layer, either
//! human-readable or JSON.

mod subscriber;

pub use subscriber::{TelemetryConfig, TelemetryError, init_tracing};
