//! Value Objects - Immutable, identity-less domain primitives

mod member_kind;
mod member_name;
mod probability;

pub use member_kind::MemberKind;
pub use member_name::{MemberName, is_reserved_name};
pub use probability::Probability;
