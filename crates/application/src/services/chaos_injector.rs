//! Chaos injection service
//!
//! Entry point of the library. Every operation validates the policy first,
//! builds a fresh decision function bound to the injector's random source and
//! installs it on the target, either in place or on a new proxy.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use super::decision::Decision;
use super::dynamic_object::DynamicObject;
use super::interceptor::Interceptor;
use super::policy::ChaosPolicy;
use super::proxy::{ChaosProxy, Injectable};
use crate::error::{ApplicationError, WrapError};
use crate::ports::RandomSource;

/// Service that makes objects chaos-enabled
#[derive(Clone)]
pub struct ChaosInjector {
    random: Arc<dyn RandomSource>,
}

impl fmt::Debug for ChaosInjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChaosInjector").finish_non_exhaustive()
    }
}

impl ChaosInjector {
    /// Create an injector drawing from `random`
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// Make `target` chaos-enabled in place
    ///
    /// Any previously installed interceptor is replaced, together with its
    /// statistics.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::InvalidPolicy` if the policy is out of range;
    /// `target` is left untouched in that case.
    #[instrument(skip_all, fields(target_type = %target.type_name()))]
    pub fn inject<I: Injectable>(
        &self,
        target: &mut I,
        policy: &ChaosPolicy,
    ) -> Result<(), ApplicationError> {
        let interceptor = self.interceptor_for(policy, target.type_name())?;
        target.install_interceptor(interceptor);
        debug!("Chaos interceptor installed in place");
        Ok(())
    }

    /// Turn a typed value into its chaos-enabled form
    ///
    /// # Errors
    ///
    /// Returns a [`WrapError`] carrying `ApplicationError::InvalidPolicy` if
    /// the policy is out of range; the target is handed back unchanged.
    #[instrument(skip_all, fields(target_type = std::any::type_name::<T>()))]
    pub fn wrap<T>(&self, target: T, policy: &ChaosPolicy) -> Result<ChaosProxy<T>, WrapError<T>> {
        match self.interceptor_for(policy, std::any::type_name::<T>()) {
            Ok(interceptor) => {
                debug!("Wrapped target in chaos proxy");
                Ok(ChaosProxy::new(target, interceptor))
            },
            Err(err) => Err(WrapError::new(target, err)),
        }
    }

    /// Create a chaos-enabled proxy over a copy of `target`
    ///
    /// The copy is made with `Clone`, so the original stays unmodified and
    /// fully functional as far as its `Clone` goes: state behind shared
    /// handles (`Arc`, `Rc`, channels) is shared between the two.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::InvalidPolicy` if the policy is out of range.
    #[instrument(skip_all, fields(target_type = std::any::type_name::<T>()))]
    pub fn create_proxy<T: Clone>(
        &self,
        target: &T,
        policy: &ChaosPolicy,
    ) -> Result<ChaosProxy<T>, ApplicationError> {
        let interceptor = self.interceptor_for(policy, std::any::type_name::<T>())?;
        debug!("Created chaos proxy over copied target");
        Ok(ChaosProxy::new(target.clone(), interceptor))
    }

    /// Create a chaos-enabled instance of the same type as `original`
    ///
    /// Attributes are deep-copied; the type's initializer is not run and any
    /// interceptor installed on `original` is not carried over.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::InvalidPolicy` if the policy is out of range.
    #[instrument(skip_all, fields(target_type = %original.object_type().name()))]
    pub fn create_object_proxy(
        &self,
        original: &DynamicObject,
        policy: &ChaosPolicy,
    ) -> Result<DynamicObject, ApplicationError> {
        let interceptor = self.interceptor_for(policy, original.object_type().name())?;
        let mut proxy = DynamicObject::from_parts(
            Arc::clone(original.object_type()),
            original.attributes().clone(),
        );
        proxy.install_interceptor(interceptor);
        debug!(
            attributes = original.attributes().len(),
            "Created chaos proxy instance"
        );
        Ok(proxy)
    }

    fn interceptor_for(
        &self,
        policy: &ChaosPolicy,
        type_name: impl Into<Arc<str>>,
    ) -> Result<Interceptor, ApplicationError> {
        let decision = Decision::from_policy(policy, Arc::clone(&self.random))?;
        debug!(
            probability = policy.probability(),
            method_probs = policy.method_probs().len(),
            custom_decider = decision.is_custom(),
            "Built chaos decision"
        );
        Ok(Interceptor::new(decision, type_name))
    }
}
