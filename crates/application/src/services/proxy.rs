//! Typed chaos wrapper
//!
//! `ChaosProxy<T>` composes a target with an [`Interceptor`]. Capability
//! traits are implemented for the wrapper by routing every member through one
//! of the three accessor kinds:
//!
//! ```ignore
//! impl Service for ChaosProxy<RealService> {
//!     fn method(&self) -> Option<String> {
//!         self.call("method", |s| s.method()).flatten()
//!     }
//! }
//! ```
//!
//! `Clone`, `Debug` and `PartialEq` belong to the object's own protocol and
//! delegate to the target without consulting the interceptor.

use std::fmt;
use std::future::Future;

use super::interceptor::{ChaosStats, Interceptor};

/// Objects that can have an interceptor installed in place
///
/// Installing replaces any previously installed interceptor; interceptors
/// never stack.
pub trait Injectable {
    /// Install `interceptor` as the member-access hook
    fn install_interceptor(&mut self, interceptor: Interceptor);

    /// Name reported in logs and errors for this object's type
    fn type_name(&self) -> String;
}

/// Chaos-enabled wrapper around a typed target
pub struct ChaosProxy<T> {
    target: T,
    interceptor: Interceptor,
}

impl<T> ChaosProxy<T> {
    /// Wrap `target` with `interceptor`
    pub const fn new(target: T, interceptor: Interceptor) -> Self {
        Self {
            target,
            interceptor,
        }
    }

    /// Read a plain value member
    pub fn value<R>(&self, name: &str, read: impl FnOnce(&T) -> R) -> Option<R> {
        self.interceptor.intercept_value(name, || read(&self.target))
    }

    /// Invoke a synchronous member
    pub fn call<R>(&self, name: &str, op: impl FnOnce(&T) -> R) -> Option<R> {
        self.interceptor.intercept_call(name, || op(&self.target))
    }

    /// Invoke a synchronous member that mutates the target
    pub fn call_mut<R>(&mut self, name: &str, op: impl FnOnce(&mut T) -> R) -> Option<R> {
        let target = &mut self.target;
        self.interceptor.intercept_call(name, || op(target))
    }

    /// Invoke an asynchronous member
    ///
    /// When substituted, `op` is never called and the future resolves to
    /// `None` without suspending.
    pub fn call_async<'a, R, F, Fut>(
        &'a self,
        name: &str,
        op: F,
    ) -> impl Future<Output = Option<R>> + use<'a, T, R, F, Fut>
    where
        F: FnOnce(&'a T) -> Fut,
        Fut: Future<Output = R>,
    {
        let target = &self.target;
        self.interceptor.intercept_async(name, move || op(target))
    }

    /// Installed interceptor
    pub const fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    /// Statistics of the installed interceptor
    pub fn stats(&self) -> ChaosStats {
        self.interceptor.stats()
    }

    /// Remove chaos and return the target
    pub fn into_inner(self) -> T {
        self.target
    }
}

impl<T> Injectable for ChaosProxy<T> {
    fn install_interceptor(&mut self, interceptor: Interceptor) {
        self.interceptor = interceptor;
    }

    fn type_name(&self) -> String {
        std::any::type_name::<T>().to_string()
    }
}

impl<T: Clone> Clone for ChaosProxy<T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            interceptor: self.interceptor.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ChaosProxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChaosProxy")
            .field("target", &self.target)
            .field("target_type", &self.interceptor.target_type())
            .finish_non_exhaustive()
    }
}

impl<T: PartialEq> PartialEq for ChaosProxy<T> {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
    }
}
