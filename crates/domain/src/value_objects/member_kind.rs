//! Member kind value object

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape of a member, which decides the shape of its no-op substitute
///
/// - `Value`: plain attribute, substituted by `null`
/// - `Sync`: synchronous operation, substituted by an operation returning `null`
/// - `Async`: asynchronous operation, substituted by an operation whose future
///   resolves to `null` on first poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    /// Plain attribute/value accessor
    Value,
    /// Synchronous callable
    Sync,
    /// Asynchronous callable
    Async,
}

impl MemberKind {
    /// Get a human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Sync => "sync",
            Self::Async => "async",
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
