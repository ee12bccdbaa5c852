//! Member name value object

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

/// Marker that opens and closes a reserved member name
const RESERVED_MARKER: &str = "__";

/// Name of a member (attribute or operation) reachable through an object
///
/// Names of the form `__name__` belong to the object's own runtime protocol
/// (construction, representation, equality, copying) and are never eligible
/// for chaos substitution.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberName(String);

impl MemberName {
    /// Create a new member name
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidMemberName` for empty names or names
    /// containing whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidMemberName(name));
        }
        Ok(Self(name))
    }

    /// Get the name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Check whether a raw member name is reserved (`__name__`)
///
/// # Examples
///
/// ```
/// use domain::value_objects::is_reserved_name;
///
/// assert!(is_reserved_name("__repr__"));
/// assert!(!is_reserved_name("__"));
/// assert!(!is_reserved_name("_private"));
/// ```
#[must_use]
pub fn is_reserved_name(name: &str) -> bool {
    name.len() > RESERVED_MARKER.len() * 2
        && name.starts_with(RESERVED_MARKER)
        && name.ends_with(RESERVED_MARKER)
}

impl fmt::Display for MemberName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MemberName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MemberName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for MemberName {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MemberName> for String {
    fn from(name: MemberName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        assert!(MemberName::new("method").is_ok());
        assert!(MemberName::new("another_method").is_ok());
        assert!(MemberName::new("__init__").is_ok());
    }

    #[test]
    fn empty_name_rejected() {
        let err = MemberName::new("").unwrap_err();
        assert_eq!(err.to_string(), "Invalid member name: ''");
    }

    #[test]
    fn whitespace_name_rejected() {
        assert!(MemberName::new("my method").is_err());
        assert!(MemberName::new("tab\t").is_err());
    }

    #[test]
    fn reserved_detection() {
        assert!(is_reserved_name("__eq__"));
        assert!(is_reserved_name("__x__"));
        assert!(!is_reserved_name("method"));
        assert!(!is_reserved_name("__private"));
        assert!(!is_reserved_name("trailing__"));
    }

    #[test]
    fn bare_markers_are_not_reserved() {
        assert!(!is_reserved_name("__"));
        assert!(!is_reserved_name("____"));
        assert!(is_reserved_name("_____"));
    }

    #[test]
    fn display_and_as_ref() {
        let name = MemberName::new("attr").unwrap();
        assert_eq!(name.to_string(), "attr");
        assert_eq!(name.as_ref(), "attr");
        assert_eq!(name.as_str(), "attr");
    }

    #[test]
    fn serde_round_trip_validates() {
        let name = MemberName::new("fetch").unwrap();
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"fetch\"");

        let invalid: Result<MemberName, _> = serde_json::from_str("\"\"");
        assert!(invalid.is_err());
    }
}
