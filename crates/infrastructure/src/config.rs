//! Chaos configuration
//!
//! Layered the usual way: built-in defaults, then an optional `chaos.toml` in
//! the working directory, then `CHAOS__*` environment variables
//! (e.g. `CHAOS__PROBABILITY=0.2`, `CHAOS__METHOD_PROBS__FETCH=0.9`).

use std::collections::HashMap;
use std::path::Path;

use application::{ApplicationError, ChaosPolicy, DEFAULT_PROBABILITY};
use config::{ConfigError, FileFormat, Source};
use serde::{Deserialize, Serialize};

use crate::telemetry::TelemetryConfig;

/// Base name of the optional configuration file (`chaos.toml`)
pub const CONFIG_FILE: &str = "chaos";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "CHAOS";

/// Separator between prefix and nested keys in environment overrides
const ENV_SEPARATOR: &str = "__";

/// Chaos injection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChaosConfig {
    /// Whether chaos is injected at all; when `false` every access is real
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Fallback probability of using the real implementation
    #[serde(default = "default_probability")]
    pub probability: f64,

    /// Per-member probabilities of using the real implementation
    #[serde(default)]
    pub method_probs: HashMap<String, f64>,

    /// Seed for reproducible runs; a thread-local source is used when unset
    #[serde(default)]
    pub seed: Option<u64>,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

const fn default_enabled() -> bool {
    true
}

const fn default_probability() -> f64 {
    DEFAULT_PROBABILITY
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            probability: default_probability(),
            method_probs: HashMap::new(),
            seed: None,
            telemetry: TelemetryConfig::default(),
        }
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

impl ChaosConfig {
    /// Load configuration from defaults, optional `chaos.toml` and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::layered(
            config::File::with_name(CONFIG_FILE).required(false),
            env_source(),
        )
    }

    /// Load configuration from the file at `path`, with environment overrides
    ///
    /// The format is inferred from the file extension.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::layered(config::File::from(path.as_ref()), env_source())
    }

    /// Parse configuration from a TOML document, without environment overrides
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Load configuration and turn it into a validated policy
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` if loading fails and
    /// `ApplicationError::InvalidPolicy` if a probability is out of range.
    pub fn load_policy() -> Result<ChaosPolicy, ApplicationError> {
        Self::load()
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?
            .to_policy()
    }

    fn layered<S>(file: S, env: config::Environment) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let builder = config::Config::builder()
            // Start with defaults
            .set_default("enabled", default_enabled())?
            .set_default("probability", default_probability())?
            .add_source(file)
            // Override with environment variables
            .add_source(env);

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Build the policy described by this configuration
    ///
    /// A disabled configuration yields a policy that always uses the real
    /// implementation.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::InvalidPolicy` if a probability is out of range.
    pub fn to_policy(&self) -> Result<ChaosPolicy, ApplicationError> {
        if !self.enabled {
            return Ok(ChaosPolicy::always_real());
        }

        let policy = ChaosPolicy::with_rate(self.probability)
            .with_method_probs(self.method_probs.clone());
        policy.validate()?;
        Ok(policy)
    }
}
