//! Chaos policy and its validation
//!
//! A policy parameterizes the decision function: an optional custom predicate
//! (`decider`), per-member probabilities (`method_probs`) and a fallback
//! probability for every other member.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use domain::Probability;

use crate::error::ApplicationError;

/// Predicate mapping a member name to "use the real implementation"
pub type Decider = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Fallback probability used when none is configured
pub const DEFAULT_PROBABILITY: f64 = 0.5;

/// Decision configuration for one injection call
///
/// Precedence: `decider` wins outright, then `method_probs` for the names it
/// contains, then `probability` for everything else.
#[derive(Clone)]
pub struct ChaosPolicy {
    probability: f64,
    decider: Option<Decider>,
    method_probs: HashMap<String, f64>,
}

impl fmt::Debug for ChaosPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChaosPolicy")
            .field("probability", &self.probability)
            .field("has_decider", &self.decider.is_some())
            .field("method_probs", &self.method_probs)
            .finish()
    }
}

impl Default for ChaosPolicy {
    fn default() -> Self {
        Self {
            probability: DEFAULT_PROBABILITY,
            decider: None,
            method_probs: HashMap::new(),
        }
    }
}

impl ChaosPolicy {
    /// Create a policy with the default fallback probability (0.5)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy that always uses the real implementation
    pub fn always_real() -> Self {
        Self::with_rate(Probability::ALWAYS.value())
    }

    /// Create a policy that substitutes every user-facing member
    pub fn always_noop() -> Self {
        Self::with_rate(Probability::NEVER.value())
    }

    /// Create a policy with the given fallback probability
    pub fn with_rate(probability: f64) -> Self {
        Self {
            probability,
            ..Self::default()
        }
    }

    /// Set the fallback probability
    #[must_use]
    pub const fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    /// Set a custom decider; it overrides every probability
    #[must_use]
    pub fn with_decider<F>(mut self, decider: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.decider = Some(Arc::new(decider));
        self
    }

    /// Set the probability for a single member
    #[must_use]
    pub fn with_method_probability(mut self, name: impl Into<String>, probability: f64) -> Self {
        self.method_probs.insert(name.into(), probability);
        self
    }

    /// Replace all per-member probabilities
    #[must_use]
    pub fn with_method_probs(mut self, method_probs: HashMap<String, f64>) -> Self {
        self.method_probs = method_probs;
        self
    }

    /// Fallback probability
    pub const fn probability(&self) -> f64 {
        self.probability
    }

    /// Custom decider, if any
    pub fn decider(&self) -> Option<&Decider> {
        self.decider.as_ref()
    }

    /// Per-member probabilities
    pub const fn method_probs(&self) -> &HashMap<String, f64> {
        &self.method_probs
    }

    /// Check every probability lies in [0, 1]
    ///
    /// Pure precondition check; callers run it before touching any object.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::InvalidPolicy` naming the fallback probability
    /// or every offending per-member entry.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if !Probability::is_valid(self.probability) {
            return Err(ApplicationError::InvalidPolicy(format!(
                "Probability must be between 0 and 1, got {}",
                self.probability
            )));
        }

        let invalid: BTreeMap<&str, f64> = self
            .method_probs
            .iter()
            .filter(|(_, p)| !Probability::is_valid(**p))
            .map(|(name, p)| (name.as_str(), *p))
            .collect();

        if !invalid.is_empty() {
            let listed = invalid
                .iter()
                .map(|(name, p)| format!("{name}: {p}"))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ApplicationError::InvalidPolicy(format!(
                "Method probabilities must be between 0 and 1, invalid: {{{listed}}}"
            )));
        }

        Ok(())
    }
}
