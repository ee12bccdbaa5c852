//! Infrastructure layer - Adapters and wiring
//!
//! Implements the application's `RandomSource` port, loads chaos
//! configuration and sets up tracing.

pub mod adapters;
pub mod config;
pub mod factory;
pub mod telemetry;

pub use adapters::*;
pub use self::config::{CONFIG_FILE, ChaosConfig, ENV_PREFIX};
pub use factory::{build_injector, random_source};
pub use telemetry::{TelemetryConfig, TelemetryError, init_tracing};
