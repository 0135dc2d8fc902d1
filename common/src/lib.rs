//! Common types for the ATM controller
//!
//! This library contains the value objects and the error type shared by the
//! controller and every storage backend: raw values, amounts, validation
//! rules, validated PINs and account identifiers.

pub mod error;
pub mod model;
pub mod money;

/// Re-export important types
pub use error::{Error, Result, ErrorExt};
pub use model::{
    AccountIdentifier, DefaultRule, FnRule, PatternRule, RawValue, ValidatedPin, ValidationRule,
};
pub use money::{amount_from_raw, Amount};
