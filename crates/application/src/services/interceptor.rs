//! Access interceptor
//!
//! Sits on the member-resolution path of a chaos-enabled object. For every
//! access it either lets the real member through or hands back a no-op
//! substitute shaped like the real member:
//! - value: `None`
//! - synchronous operation: `None`, the real operation is never invoked
//! - asynchronous operation: a future resolving to `None` on first poll
//!
//! Reserved (`__name__`) members always pass through and never draw.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use domain::{MemberKind, is_reserved_name};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::decision::Decision;

/// Statistics about intercepted accesses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaosStats {
    /// Total number of accesses that went through the interceptor
    pub total_accesses: u64,
    /// Accesses served by the real member
    pub real_accesses: u64,
    /// Accesses to reserved members (always real, never drawn)
    pub reserved_accesses: u64,
    /// Plain values replaced by `null`
    pub substituted_values: u64,
    /// Synchronous operations replaced by a no-op
    pub substituted_calls: u64,
    /// Asynchronous operations replaced by a ready no-op future
    pub substituted_async_calls: u64,
}

impl ChaosStats {
    /// Total number of substitutions of any shape
    pub const fn substitutions(&self) -> u64 {
        self.substituted_values + self.substituted_calls + self.substituted_async_calls
    }

    /// Calculate the share of accesses that were substituted
    #[allow(clippy::cast_precision_loss)]
    pub fn substitution_rate(&self) -> f64 {
        if self.total_accesses == 0 {
            0.0
        } else {
            self.substitutions() as f64 / self.total_accesses as f64
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    total: AtomicU64,
    real: AtomicU64,
    reserved: AtomicU64,
    values: AtomicU64,
    calls: AtomicU64,
    async_calls: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> ChaosStats {
        ChaosStats {
            total_accesses: self.total.load(Ordering::Relaxed),
            real_accesses: self.real.load(Ordering::Relaxed),
            reserved_accesses: self.reserved.load(Ordering::Relaxed),
            substituted_values: self.values.load(Ordering::Relaxed),
            substituted_calls: self.calls.load(Ordering::Relaxed),
            substituted_async_calls: self.async_calls.load(Ordering::Relaxed),
        }
    }
}

/// Member-access hook installed on a chaos-enabled object
///
/// Clones share the decision function and the statistics counters.
#[derive(Debug, Clone)]
pub struct Interceptor {
    decision: Decision,
    target_type: Arc<str>,
    counters: Arc<Counters>,
}

impl Interceptor {
    /// Create an interceptor for objects of `target_type`
    pub fn new(decision: Decision, target_type: impl Into<Arc<str>>) -> Self {
        Self {
            decision,
            target_type: target_type.into(),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Name of the type this interceptor was built for
    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    /// Decide whether an access to `name` is served by the real member
    ///
    /// Records the outcome; a `false` result means the caller must hand out
    /// the substitute for `kind`.
    pub fn admits(&self, name: &str, kind: MemberKind) -> bool {
        self.counters.total.fetch_add(1, Ordering::Relaxed);

        if is_reserved_name(name) {
            self.counters.reserved.fetch_add(1, Ordering::Relaxed);
            return true;
        }

        if self.decision.decide(name) {
            self.counters.real.fetch_add(1, Ordering::Relaxed);
            return true;
        }

        let counter = match kind {
            MemberKind::Value => &self.counters.values,
            MemberKind::Sync => &self.counters.calls,
            MemberKind::Async => &self.counters.async_calls,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        trace!(
            target_type = %self.target_type,
            member = name,
            kind = %kind,
            "Substituting no-op for member"
        );
        false
    }

    /// Intercept a plain value read
    pub fn intercept_value<R>(&self, name: &str, read: impl FnOnce() -> R) -> Option<R> {
        self.admits(name, MemberKind::Value).then(read)
    }

    /// Intercept a synchronous operation; `op` only runs when admitted
    pub fn intercept_call<R>(&self, name: &str, op: impl FnOnce() -> R) -> Option<R> {
        self.admits(name, MemberKind::Sync).then(op)
    }

    /// Intercept an asynchronous operation
    ///
    /// The decision is taken now, at access time. When substituted, `op` is
    /// never called and the returned future is ready on first poll.
    pub fn intercept_async<R, F, Fut>(
        &self,
        name: &str,
        op: F,
    ) -> impl Future<Output = Option<R>> + use<R, F, Fut>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = R>,
    {
        let pending = self.admits(name, MemberKind::Async).then(op);
        async move {
            match pending {
                Some(fut) => Some(fut.await),
                None => None,
            }
        }
    }

    /// Current statistics snapshot
    pub fn stats(&self) -> ChaosStats {
        self.counters.snapshot()
    }

    /// Whether the decision is delegated to a custom decider
    pub fn is_custom(&self) -> bool {
        self.decision.is_custom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockRandomSource;
    use crate::services::ChaosPolicy;
    use std::cell::Cell;
    use tokio_test::{assert_ready, task};

    fn interceptor(policy: &ChaosPolicy, draw: f64) -> Interceptor {
        let mut mock = MockRandomSource::new();
        mock.expect_next_f64().return_const(draw);
        let decision = Decision::from_policy(policy, Arc::new(mock)).unwrap();
        Interceptor::new(decision, "TestClass")
    }

    #[test]
    fn admitted_value_is_read() {
        let interceptor = interceptor(&ChaosPolicy::always_real(), 0.3);
        assert_eq!(interceptor.intercept_value("attr", || "real_attr"), Some("real_attr"));
    }

    #[test]
    fn substituted_value_is_none() {
        let interceptor = interceptor(&ChaosPolicy::always_noop(), 0.3);
        assert_eq!(interceptor.intercept_value("attr", || "real_attr"), None);
    }

    #[test]
    fn substituted_call_has_no_side_effect() {
        let interceptor = interceptor(&ChaosPolicy::always_noop(), 0.3);
        let invoked = Cell::new(false);

        let result = interceptor.intercept_call("method", || {
            invoked.set(true);
            "real_method_result"
        });

        assert_eq!(result, None);
        assert!(!invoked.get());
    }

    #[test]
    fn reserved_members_bypass_decision() {
        let mut mock = MockRandomSource::new();
        mock.expect_next_f64().never();
        let decision =
            Decision::from_policy(&ChaosPolicy::always_noop(), Arc::new(mock)).unwrap();
        let interceptor = Interceptor::new(decision, "TestClass");

        assert_eq!(interceptor.intercept_value("__repr__", || 1), Some(1));
        assert_eq!(interceptor.intercept_call("__eq__", || true), Some(true));
        assert_eq!(interceptor.stats().reserved_accesses, 2);
    }

    #[tokio::test]
    async fn admitted_async_runs_real_future() {
        let interceptor = interceptor(&ChaosPolicy::always_real(), 0.3);
        let result = interceptor.intercept_async("fetch", || async { 42 }).await;
        assert_eq!(result, Some(42));
    }

    #[test]
    fn substituted_async_is_ready_immediately() {
        let interceptor = interceptor(&ChaosPolicy::always_noop(), 0.3);
        let invoked = Cell::new(false);

        let mut fut = task::spawn(interceptor.intercept_async("fetch", || {
            invoked.set(true);
            std::future::pending::<i32>()
        }));

        assert_eq!(assert_ready!(fut.poll()), None);
        assert!(!invoked.get());
    }

    #[test]
    fn decision_taken_at_access_time() {
        let interceptor = interceptor(&ChaosPolicy::always_noop(), 0.3);
        let fut = interceptor.intercept_async("fetch", || async { 1 });
        assert_eq!(interceptor.stats().substituted_async_calls, 1);
        drop(fut);
    }

    #[test]
    fn stats_track_each_shape() {
        let interceptor = interceptor(&ChaosPolicy::with_rate(0.5), 0.9);

        let _ = interceptor.intercept_value("attr", || 1);
        let _ = interceptor.intercept_call("method", || 2);
        drop(interceptor.intercept_async("fetch", || async { 3 }));
        let _ = interceptor.intercept_value("__dict__", || 4);

        let stats = interceptor.stats();
        assert_eq!(stats.total_accesses, 4);
        assert_eq!(stats.substituted_values, 1);
        assert_eq!(stats.substituted_calls, 1);
        assert_eq!(stats.substituted_async_calls, 1);
        assert_eq!(stats.reserved_accesses, 1);
        assert_eq!(stats.real_accesses, 0);
        assert_eq!(stats.substitutions(), 3);
        assert!((stats.substitution_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn clones_share_counters() {
        let interceptor = interceptor(&ChaosPolicy::always_real(), 0.1);
        let clone = interceptor.clone();
        let _ = clone.intercept_value("attr", || ());
        assert_eq!(interceptor.stats().real_accesses, 1);
    }

    #[test]
    fn empty_stats_rate_is_zero() {
        assert!(ChaosStats::default().substitution_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn target_type_is_kept() {
        let interceptor = interceptor(&ChaosPolicy::default(), 0.1);
        assert_eq!(interceptor.target_type(), "TestClass");
        assert!(!interceptor.is_custom());
    }
}
