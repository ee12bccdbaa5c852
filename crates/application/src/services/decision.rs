//! Decision function built from a chaos policy
//!
//! Decides, per member name, whether an access is served by the real
//! implementation. Probabilistic branches draw a fresh value on every call;
//! nothing is cached between accesses.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use domain::Probability;

use super::policy::{ChaosPolicy, Decider};
use crate::error::ApplicationError;
use crate::ports::RandomSource;

enum Rule {
    Decider(Decider),
    Probabilistic {
        method_probs: HashMap<String, Probability>,
        fallback: Probability,
    },
}

/// Per-injection decision function
///
/// Cheap to clone; clones share the same rule and random source.
#[derive(Clone)]
pub struct Decision {
    rule: Arc<Rule>,
    random: Arc<dyn RandomSource>,
}

impl fmt::Debug for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Decision");
        match self.rule.as_ref() {
            Rule::Decider(_) => debug.field("rule", &"decider"),
            Rule::Probabilistic {
                method_probs,
                fallback,
            } => debug
                .field("method_probs", method_probs)
                .field("fallback", fallback),
        };
        debug.finish_non_exhaustive()
    }
}

impl Decision {
    /// Validate `policy` and build its decision function
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::InvalidPolicy` if any probability lies
    /// outside [0, 1].
    pub fn from_policy(
        policy: &ChaosPolicy,
        random: Arc<dyn RandomSource>,
    ) -> Result<Self, ApplicationError> {
        policy.validate()?;

        let rule = if let Some(decider) = policy.decider() {
            Rule::Decider(Arc::clone(decider))
        } else {
            let method_probs = policy
                .method_probs()
                .iter()
                .map(|(name, p)| Ok((name.clone(), to_probability(*p)?)))
                .collect::<Result<HashMap<_, _>, ApplicationError>>()?;
            Rule::Probabilistic {
                method_probs,
                fallback: to_probability(policy.probability())?,
            }
        };

        Ok(Self {
            rule: Arc::new(rule),
            random,
        })
    }

    /// Decide whether `name` is served by the real implementation
    pub fn decide(&self, name: &str) -> bool {
        match self.rule.as_ref() {
            Rule::Decider(decider) => decider(name),
            Rule::Probabilistic {
                method_probs,
                fallback,
            } => {
                let probability = method_probs.get(name).copied().unwrap_or(*fallback);
                probability.admits(self.random.next_f64())
            },
        }
    }

    /// Check whether the decision is delegated to a custom decider
    pub fn is_custom(&self) -> bool {
        matches!(self.rule.as_ref(), Rule::Decider(_))
    }
}

fn to_probability(value: f64) -> Result<Probability, ApplicationError> {
    Probability::new(value).map_err(|e| ApplicationError::InvalidPolicy(e.to_string()))
}
