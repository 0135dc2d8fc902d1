//! Value objects for the ATM controller

pub mod rule;
pub mod pin;
pub mod account;

/// Opaque raw value handed in by callers or returned by backends.
///
/// The framework only inspects it through validation rules and query
/// contracts; in practice pins and account ids are strings.
pub type RawValue = serde_json::Value;

pub use account::AccountIdentifier;
pub use pin::ValidatedPin;
pub use rule::{DefaultRule, FnRule, PatternRule, ValidationRule};
