//! Application-level errors

use std::fmt;

use domain::{DomainError, MemberKind};
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Policy parameters out of range; raised before any object is touched
    #[error("Invalid chaos policy: {0}")]
    InvalidPolicy(String),

    /// The object has no member with this name
    #[error("'{type_name}' object has no member '{member}'")]
    MemberNotFound { type_name: String, member: String },

    /// The member exists but was accessed as a different shape
    #[error("Member '{member}' is a {actual} member, not a {expected} member")]
    MemberKindMismatch {
        member: String,
        expected: MemberKind,
        actual: MemberKind,
    },

    /// The method mutates its receiver and needs exclusive access
    #[error("Member '{0}' mutates its receiver; invoke it through call_mut")]
    MutableReceiverRequired(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Create a member-not-found error
    pub fn member_not_found(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        Self::MemberNotFound {
            type_name: type_name.into(),
            member: member.into(),
        }
    }

    /// Check if this error rejected a policy
    pub const fn is_invalid_policy(&self) -> bool {
        matches!(self, Self::InvalidPolicy(_))
    }

    /// Check if this error reports a missing member
    pub const fn is_member_not_found(&self) -> bool {
        matches!(self, Self::MemberNotFound { .. })
    }
}

/// Rejected wrap request; hands the untouched target back to the caller
pub struct WrapError<T> {
    target: T,
    source: ApplicationError,
}

impl<T> WrapError<T> {
    pub(crate) const fn new(target: T, source: ApplicationError) -> Self {
        Self { target, source }
    }

    /// Why the request was rejected
    pub const fn error(&self) -> &ApplicationError {
        &self.source
    }

    /// Take the target back
    pub fn into_target(self) -> T {
        self.target
    }

    /// Split into the target and the rejection reason
    pub fn into_parts(self) -> (T, ApplicationError) {
        (self.target, self.source)
    }
}

impl<T> fmt::Debug for WrapError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapError")
            .field("target", &std::any::type_name::<T>())
            .field("source", &self.source)
            .finish()
    }
}

impl<T> fmt::Display for WrapError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.source, f)
    }
}

impl<T> std::error::Error for WrapError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl<T> From<WrapError<T>> for ApplicationError {
    fn from(err: WrapError<T>) -> Self {
        err.source
    }
}
