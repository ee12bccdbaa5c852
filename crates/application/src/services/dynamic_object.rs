//! Dynamic object model
//!
//! Objects whose members are only known at runtime: an [`ObjectType`] declares
//! type-level attributes plus synchronous and asynchronous methods, and every
//! [`DynamicObject`] carries its own free-form attribute map. Member access
//! goes through the installed [`Interceptor`], if any.
//!
//! Resolution order is instance attributes, then methods, then type-level
//! attributes. A name that resolves to nothing fails with
//! `ApplicationError::MemberNotFound` before any decision is taken.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use domain::{MemberKind, MemberName};
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use serde_json::{Map, Value};

use super::interceptor::{ChaosStats, Interceptor};
use super::proxy::Injectable;
use crate::error::ApplicationError;

/// Attribute storage of a dynamic object
pub type Attributes = Map<String, Value>;

/// Synchronous method: reads the receiver's attributes and the call arguments
pub type SyncMethod = Arc<dyn Fn(&Attributes, &[Value]) -> Value + Send + Sync>;

/// Mutating method: updates the receiver's attributes in place
pub type MutMethod = Arc<dyn Fn(&mut Attributes, &[Value]) -> Value + Send + Sync>;

/// Asynchronous method: owns a snapshot of the receiver's attributes
pub type AsyncMethod = Arc<dyn Fn(Attributes, Vec<Value>) -> BoxFuture<'static, Value> + Send + Sync>;

/// Constructor logic run by [`DynamicObject::new`]
pub type Initializer = Arc<dyn Fn(&mut Attributes) + Send + Sync>;

#[derive(Clone)]
enum Method {
    Sync(SyncMethod),
    Mut(MutMethod),
    Async(AsyncMethod),
}

impl Method {
    const fn kind(&self) -> MemberKind {
        match self {
            Self::Sync(_) | Self::Mut(_) => MemberKind::Sync,
            Self::Async(_) => MemberKind::Async,
        }
    }
}

enum Member<'a> {
    Value(&'a Value),
    Method(&'a Method),
}

impl Member<'_> {
    const fn kind(&self) -> MemberKind {
        match self {
            Self::Value(_) => MemberKind::Value,
            Self::Method(method) => method.kind(),
        }
    }
}

/// Runtime type of a [`DynamicObject`]
pub struct ObjectType {
    name: String,
    attributes: Attributes,
    methods: HashMap<String, Method>,
    initializer: Option<Initializer>,
}

impl ObjectType {
    /// Start declaring a type called `name`
    pub fn builder(name: impl Into<String>) -> ObjectTypeBuilder {
        ObjectTypeBuilder {
            ty: Self {
                name: name.into(),
                attributes: Map::new(),
                methods: HashMap::new(),
                initializer: None,
            },
        }
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type-level attribute, shared by every instance
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.methods.keys().collect();
        methods.sort();
        f.debug_struct("ObjectType")
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field("methods", &methods)
            .field("has_initializer", &self.initializer.is_some())
            .finish()
    }
}

/// Builder for [`ObjectType`]
#[must_use]
pub struct ObjectTypeBuilder {
    ty: ObjectType,
}

impl ObjectTypeBuilder {
    /// Declare a type-level attribute
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ty.attributes.insert(name.into(), value.into());
        self
    }

    /// Declare a synchronous method
    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&Attributes, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.ty
            .methods
            .insert(name.into(), Method::Sync(Arc::new(method)));
        self
    }

    /// Declare a synchronous method that mutates its receiver
    pub fn mut_method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&mut Attributes, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.ty
            .methods
            .insert(name.into(), Method::Mut(Arc::new(method)));
        self
    }

    /// Declare an asynchronous method
    pub fn async_method<F, Fut>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(Attributes, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        let method: AsyncMethod = Arc::new(move |attrs, args| method(attrs, args).boxed());
        self.ty.methods.insert(name.into(), Method::Async(method));
        self
    }

    /// Constructor logic run for every instance created with [`DynamicObject::new`]
    pub fn initializer<F>(mut self, init: F) -> Self
    where
        F: Fn(&mut Attributes) + Send + Sync + 'static,
    {
        self.ty.initializer = Some(Arc::new(init));
        self
    }

    /// Finish the declaration
    pub fn build(self) -> Arc<ObjectType> {
        Arc::new(self.ty)
    }
}

impl fmt::Debug for ObjectTypeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectTypeBuilder")
            .field("name", &self.ty.name)
            .finish_non_exhaustive()
    }
}

/// Instance of an [`ObjectType`]
///
/// `Clone` deep-copies the attributes and keeps the installed interceptor.
/// `Debug`, `PartialEq`, [`attributes`](Self::attributes) and
/// [`is_instance_of`](Self::is_instance_of) never go through the interceptor.
#[derive(Clone)]
pub struct DynamicObject {
    ty: Arc<ObjectType>,
    attrs: Attributes,
    interceptor: Option<Interceptor>,
}

impl DynamicObject {
    /// Create an instance, running the type's initializer
    pub fn new(ty: &Arc<ObjectType>) -> Self {
        let mut attrs = Map::new();
        if let Some(init) = &ty.initializer {
            init(&mut attrs);
        }
        Self::from_parts(Arc::clone(ty), attrs)
    }

    /// Create an instance from existing attributes without running any
    /// constructor logic
    pub(crate) const fn from_parts(ty: Arc<ObjectType>, attrs: Attributes) -> Self {
        Self {
            ty,
            attrs,
            interceptor: None,
        }
    }

    /// Read a value member
    ///
    /// A substituted read yields `Value::Null`.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::MemberNotFound` if nothing resolves under
    /// `name` and `ApplicationError::MemberKindMismatch` if it is a method.
    pub fn get(&self, name: &str) -> Result<Value, ApplicationError> {
        let value = match self.resolve(name)? {
            Member::Value(value) => value,
            member @ Member::Method(_) => {
                return Err(mismatch(name, MemberKind::Value, member.kind()));
            },
        };

        Ok(match &self.interceptor {
            Some(interceptor) => interceptor
                .intercept_value(name, || value.clone())
                .unwrap_or(Value::Null),
            None => value.clone(),
        })
    }

    /// Invoke a synchronous method
    ///
    /// A substituted call returns `Value::Null` without running the method.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::MemberNotFound` if nothing resolves under
    /// `name` and `ApplicationError::MemberKindMismatch` if it is not a
    /// synchronous method. A method declared with
    /// [`mut_method`](ObjectTypeBuilder::mut_method) fails with
    /// `ApplicationError::MutableReceiverRequired`.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, ApplicationError> {
        let method = match self.resolve(name)? {
            Member::Method(Method::Sync(method)) => method,
            Member::Method(Method::Mut(_)) => {
                return Err(ApplicationError::MutableReceiverRequired(name.to_string()));
            },
            member => return Err(mismatch(name, MemberKind::Sync, member.kind())),
        };

        let invoke = || method(&self.attrs, args);
        Ok(match &self.interceptor {
            Some(interceptor) => interceptor.intercept_call(name, invoke).unwrap_or(Value::Null),
            None => invoke(),
        })
    }

    /// Invoke a synchronous method with exclusive access to the receiver
    ///
    /// Accepts both plain and mutating methods. A substituted call returns
    /// `Value::Null` and leaves the attributes untouched.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::MemberNotFound` if nothing resolves under
    /// `name` and `ApplicationError::MemberKindMismatch` if it is not a
    /// synchronous method.
    pub fn call_mut(&mut self, name: &str, args: &[Value]) -> Result<Value, ApplicationError> {
        let method: MutMethod = match self.resolve(name)? {
            Member::Method(Method::Mut(method)) => Arc::clone(method),
            Member::Method(Method::Sync(method)) => {
                let method = Arc::clone(method);
                Arc::new(move |attrs: &mut Attributes, args: &[Value]| method(attrs, args))
            },
            member => return Err(mismatch(name, MemberKind::Sync, member.kind())),
        };

        let admitted = self
            .interceptor
            .as_ref()
            .is_none_or(|interceptor| interceptor.admits(name, MemberKind::Sync));
        Ok(if admitted {
            method(&mut self.attrs, args)
        } else {
            Value::Null
        })
    }

    /// Invoke an asynchronous method
    ///
    /// The decision is taken now. A substituted call hands back a future that
    /// resolves to `Value::Null` on first poll; the method is never run.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::MemberNotFound` if nothing resolves under
    /// `name` and `ApplicationError::MemberKindMismatch` if it is not an
    /// asynchronous method.
    pub fn call_async(
        &self,
        name: &str,
        args: Vec<Value>,
    ) -> Result<BoxFuture<'static, Value>, ApplicationError> {
        let method = match self.resolve(name)? {
            Member::Method(Method::Async(method)) => Arc::clone(method),
            member => return Err(mismatch(name, MemberKind::Async, member.kind())),
        };

        Ok(match &self.interceptor {
            Some(interceptor) if !interceptor.admits(name, MemberKind::Async) => {
                future::ready(Value::Null).boxed()
            },
            _ => method(self.attrs.clone(), args),
        })
    }

    /// Store an instance attribute; writes are never intercepted
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Domain` if `name` is not a valid member name.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ApplicationError> {
        let name = MemberName::new(name)?;
        self.attrs.insert(name.as_str().to_string(), value.into());
        Ok(())
    }

    /// Kind of the member resolved under `name`, if any
    pub fn member_kind(&self, name: &str) -> Option<MemberKind> {
        self.resolve(name).ok().map(|member| member.kind())
    }

    /// Runtime type
    pub const fn object_type(&self) -> &Arc<ObjectType> {
        &self.ty
    }

    /// Check whether this object is an instance of `ty`
    pub fn is_instance_of(&self, ty: &Arc<ObjectType>) -> bool {
        Arc::ptr_eq(&self.ty, ty)
    }

    /// Instance attributes, read without interception
    pub const fn attributes(&self) -> &Attributes {
        &self.attrs
    }

    /// Check whether an interceptor is installed
    pub const fn is_chaos_enabled(&self) -> bool {
        self.interceptor.is_some()
    }

    /// Statistics of the installed interceptor
    pub fn stats(&self) -> Option<ChaosStats> {
        self.interceptor.as_ref().map(Interceptor::stats)
    }

    fn resolve(&self, name: &str) -> Result<Member<'_>, ApplicationError> {
        if let Some(value) = self.attrs.get(name) {
            return Ok(Member::Value(value));
        }
        if let Some(method) = self.ty.methods.get(name) {
            return Ok(Member::Method(method));
        }
        self.ty
            .attributes
            .get(name)
            .map(Member::Value)
            .ok_or_else(|| ApplicationError::member_not_found(&self.ty.name, name))
    }
}

fn mismatch(name: &str, expected: MemberKind, actual: MemberKind) -> ApplicationError {
    ApplicationError::MemberKindMismatch {
        member: name.to_string(),
        expected,
        actual,
    }
}

impl Injectable for DynamicObject {
    fn install_interceptor(&mut self, interceptor: Interceptor) {
        self.interceptor = Some(interceptor);
    }

    fn type_name(&self) -> String {
        self.ty.name.clone()
    }
}

impl fmt::Debug for DynamicObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicObject")
            .field("type", &self.ty.name)
            .field("attrs", &self.attrs)
            .field("chaos_enabled", &self.interceptor.is_some())
            .finish()
    }
}

impl PartialEq for DynamicObject {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.ty, &other.ty) && self.attrs == other.attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockRandomSource;
    use crate::services::{ChaosPolicy, Decision};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_ready, task};

    fn test_class() -> Arc<ObjectType> {
        ObjectType::builder("TestClass")
            .attribute("class_attr", "class_value")
            .initializer(|attrs| {
                attrs.insert("attr".to_string(), json!("real_attr"));
            })
            .method("method", |_, _| json!("real_method_result"))
            .method("echo", |attrs, args| {
                json!({ "attr": attrs.get("attr"), "args": args })
            })
            .async_method("async_method", |_, _| async { json!("real_async_result") })
            .build()
    }

    fn interceptor(policy: &ChaosPolicy) -> Interceptor {
        let mut mock = MockRandomSource::new();
        mock.expect_next_f64().return_const(0.5);
        let decision = Decision::from_policy(policy, Arc::new(mock)).unwrap();
        Interceptor::new(decision, "TestClass")
    }

    #[test]
    fn plain_object_serves_every_member() {
        let obj = DynamicObject::new(&test_class());

        assert_eq!(obj.get("attr").unwrap(), json!("real_attr"));
        assert_eq!(obj.get("class_attr").unwrap(), json!("class_value"));
        assert_eq!(obj.call("method", &[]).unwrap(), json!("real_method_result"));
        assert_eq!(
            obj.call("echo", &[json!(1)]).unwrap(),
            json!({ "attr": "real_attr", "args": [1] })
        );
        assert!(!obj.is_chaos_enabled());
        assert!(obj.stats().is_none());
    }

    #[tokio::test]
    async fn plain_object_runs_async_method() {
        let obj = DynamicObject::new(&test_class());
        let result = obj.call_async("async_method", vec![]).unwrap().await;
        assert_eq!(result, json!("real_async_result"));
    }

    #[test]
    fn missing_member_fails_before_decision() {
        let mut mock = MockRandomSource::new();
        mock.expect_next_f64().never();
        let decision = Decision::from_policy(&ChaosPolicy::default(), Arc::new(mock)).unwrap();

        let mut obj = DynamicObject::new(&test_class());
        obj.install_interceptor(Interceptor::new(decision, "TestClass"));

        let err = obj.get("non_existing").unwrap_err();
        assert!(err.is_member_not_found());
        assert_eq!(err.to_string(), "'TestClass' object has no member 'non_existing'");
        assert!(obj.call("non_existing", &[]).is_err());
        assert!(obj.call_async("non_existing", vec![]).is_err());
        assert_eq!(obj.stats().unwrap().total_accesses, 0);
    }

    #[test]
    fn wrong_accessor_reports_kind() {
        let obj = DynamicObject::new(&test_class());

        assert!(matches!(
            obj.get("method"),
            Err(ApplicationError::MemberKindMismatch {
                expected: MemberKind::Value,
                actual: MemberKind::Sync,
                ..
            })
        ));
        assert!(matches!(
            obj.call("attr", &[]),
            Err(ApplicationError::MemberKindMismatch {
                actual: MemberKind::Value,
                ..
            })
        ));
        assert!(matches!(
            obj.call("async_method", &[]),
            Err(ApplicationError::MemberKindMismatch {
                actual: MemberKind::Async,
                ..
            })
        ));
    }

    #[test]
    fn substituted_members_are_null() {
        let mut obj = DynamicObject::new(&test_class());
        obj.install_interceptor(interceptor(&ChaosPolicy::always_noop()));

        assert_eq!(obj.get("attr").unwrap(), Value::Null);
        assert_eq!(obj.get("class_attr").unwrap(), Value::Null);
        assert_eq!(obj.call("method", &[]).unwrap(), Value::Null);

        let mut fut = task::spawn(obj.call_async("async_method", vec![]).unwrap());
        assert_eq!(assert_ready!(fut.poll()), Value::Null);

        let stats = obj.stats().unwrap();
        assert_eq!(stats.substituted_values, 2);
        assert_eq!(stats.substituted_calls, 1);
        assert_eq!(stats.substituted_async_calls, 1);
    }

    #[test]
    fn substituted_call_skips_side_effects() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let ty = ObjectType::builder("Counter")
            .method("hit", move |_, _| {
                seen.fetch_add(1, Ordering::SeqCst);
                Value::Null
            })
            .build();

        let mut obj = DynamicObject::new(&ty);
        obj.install_interceptor(interceptor(&ChaosPolicy::always_noop()));
        obj.call("hit", &[]).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    fn counter_class() -> Arc<ObjectType> {
        ObjectType::builder("Counter")
            .initializer(|attrs| {
                attrs.insert("count".to_string(), json!(0));
            })
            .mut_method("increment", |attrs, args| {
                let step = args.first().and_then(Value::as_i64).unwrap_or(1);
                let count = attrs.get("count").and_then(Value::as_i64).unwrap_or(0) + step;
                attrs.insert("count".to_string(), json!(count));
                json!(count)
            })
            .method("peek", |attrs, _| attrs.get("count").cloned().unwrap_or(Value::Null))
            .build()
    }

    #[test]
    fn mutating_method_updates_receiver() {
        let mut obj = DynamicObject::new(&counter_class());

        assert_eq!(obj.call_mut("increment", &[]).unwrap(), json!(1));
        assert_eq!(obj.call_mut("increment", &[json!(4)]).unwrap(), json!(5));
        assert_eq!(obj.call_mut("peek", &[]).unwrap(), json!(5));
        assert_eq!(obj.attributes().get("count"), Some(&json!(5)));
        assert_eq!(obj.member_kind("increment"), Some(MemberKind::Sync));
    }

    #[test]
    fn substituted_mutating_call_leaves_state_alone() {
        let mut obj = DynamicObject::new(&counter_class());
        obj.install_interceptor(interceptor(&ChaosPolicy::always_noop()));

        assert_eq!(obj.call_mut("increment", &[json!(3)]).unwrap(), Value::Null);
        assert_eq!(obj.attributes().get("count"), Some(&json!(0)));
        assert_eq!(obj.stats().unwrap().substituted_calls, 1);
    }

    #[test]
    fn mutating_method_needs_exclusive_receiver() {
        let mut obj = DynamicObject::new(&counter_class());

        assert!(matches!(
            obj.call("increment", &[]),
            Err(ApplicationError::MutableReceiverRequired(_))
        ));
        assert!(matches!(
            obj.call_mut("count", &[]),
            Err(ApplicationError::MemberKindMismatch {
                actual: MemberKind::Value,
                ..
            })
        ));
        assert!(obj.call_mut("missing", &[]).unwrap_err().is_member_not_found());
    }

    #[test]
    fn substituted_async_call_is_detached_from_receiver() {
        let mut obj = DynamicObject::new(&test_class());
        obj.install_interceptor(interceptor(&ChaosPolicy::always_noop()));

        let fut = obj.call_async("async_method", vec![]).unwrap();
        obj.set("attr", "changed").unwrap();

        let mut fut = task::spawn(fut);
        assert_eq!(assert_ready!(fut.poll()), Value::Null);
    }

    #[test]
    fn reserved_names_are_never_substituted() {
        let ty = ObjectType::builder("Meta")
            .attribute("__module__", "tests")
            .method("__repr__", |_, _| json!("<Meta>"))
            .build();
        let mut obj = DynamicObject::new(&ty);
        obj.install_interceptor(interceptor(&ChaosPolicy::always_noop()));

        assert_eq!(obj.get("__module__").unwrap(), json!("tests"));
        assert_eq!(obj.call("__repr__", &[]).unwrap(), json!("<Meta>"));
        assert_eq!(obj.stats().unwrap().reserved_accesses, 2);
    }

    #[test]
    fn instance_attributes_shadow_type_members() {
        let mut obj = DynamicObject::new(&test_class());
        obj.set("class_attr", "instance_value").unwrap();
        obj.set("method", 7).unwrap();

        assert_eq!(obj.get("class_attr").unwrap(), json!("instance_value"));
        assert_eq!(obj.member_kind("method"), Some(MemberKind::Value));
        assert_eq!(obj.member_kind("async_method"), Some(MemberKind::Async));
        assert_eq!(obj.member_kind("missing"), None);
    }

    #[test]
    fn set_rejects_invalid_names() {
        let mut obj = DynamicObject::new(&test_class());
        assert!(matches!(obj.set("", 1), Err(ApplicationError::Domain(_))));
        assert!(matches!(obj.set("two words", 1), Err(ApplicationError::Domain(_))));
    }

    #[test]
    fn writes_bypass_interception() {
        let mut obj = DynamicObject::new(&test_class());
        obj.install_interceptor(interceptor(&ChaosPolicy::always_noop()));
        obj.set("attr", "updated").unwrap();

        assert_eq!(obj.attributes().get("attr"), Some(&json!("updated")));
        assert_eq!(obj.stats().unwrap().total_accesses, 0);
    }

    #[test]
    fn identity_and_equality() {
        let ty = test_class();
        let other = test_class();
        let obj = DynamicObject::new(&ty);
        let mut chaotic = obj.clone();
        chaotic.install_interceptor(interceptor(&ChaosPolicy::always_noop()));

        assert!(obj.is_instance_of(&ty));
        assert!(!obj.is_instance_of(&other));
        assert_eq!(obj, chaotic);
        assert_ne!(obj, DynamicObject::new(&other));
        assert!(format!("{chaotic:?}").contains("chaos_enabled: true"));
        assert_eq!(chaotic.type_name(), "TestClass");
    }

    #[test]
    fn from_parts_skips_initializer() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let ty = ObjectType::builder("Tracked")
            .initializer(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build();

        let obj = DynamicObject::new(&ty);
        let copy = DynamicObject::from_parts(Arc::clone(obj.object_type()), obj.attributes().clone());

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(copy.is_instance_of(&ty));
    }

    #[test]
    fn type_introspection() {
        let ty = test_class();
        assert_eq!(ty.name(), "TestClass");
        assert_eq!(ty.attribute("class_attr"), Some(&json!("class_value")));
        assert_eq!(ty.attribute("method"), None);
        assert!(format!("{ty:?}").contains("async_method"));
    }
}
