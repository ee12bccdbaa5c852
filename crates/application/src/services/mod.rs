//! Application services - Chaos injection use cases
//!
//! Layered bottom-up: a [`ChaosPolicy`] is validated into a [`Decision`], the
//! decision drives an [`Interceptor`], and interceptors are installed on
//! [`ChaosProxy`] wrappers or [`DynamicObject`] instances by the
//! [`ChaosInjector`].

mod chaos_injector;
mod decision;
mod dynamic_object;
mod interceptor;
mod policy;
mod proxy;

pub use chaos_injector::ChaosInjector;
pub use decision::Decision;
pub use dynamic_object::{
    AsyncMethod, Attributes, DynamicObject, Initializer, MutMethod, ObjectType, ObjectTypeBuilder,
    SyncMethod,
};
pub use interceptor::{ChaosStats, Interceptor};
pub use policy::{ChaosPolicy, DEFAULT_PROBABILITY, Decider};
pub use proxy::{ChaosProxy, Injectable};
