//! Injector wiring
//!
//! Picks the random source described by a [`ChaosConfig`] and hands it to the
//! application-layer [`ChaosInjector`].

use std::sync::Arc;

use application::{ChaosInjector, RandomSource};
use tracing::info;

use crate::adapters::{SeededRandomSource, ThreadRandomSource};
use crate::config::ChaosConfig;

/// Build the random source for `config`
///
/// A configured seed yields a reproducible [`SeededRandomSource`]; otherwise
/// draws come from the thread-local generator.
pub fn random_source(config: &ChaosConfig) -> Arc<dyn RandomSource> {
    match config.seed {
        Some(seed) => Arc::new(SeededRandomSource::new(seed)),
        None => Arc::new(ThreadRandomSource::new()),
    }
}

/// Build a chaos injector for `config`
pub fn build_injector(config: &ChaosConfig) -> ChaosInjector {
    info!(
        enabled = config.enabled,
        probability = config.probability,
        method_probs = config.method_probs.len(),
        seed = ?config.seed,
        "Building chaos injector"
    );
    ChaosInjector::new(random_source(config))
}
