//! Error types for the ATM controller
//!
//! This module provides the single error type shared by the value objects,
//! the controller and the storage backends. Every failure is surfaced to the
//! immediate caller; nothing in the core retries or swallows an error.

use std::fmt::Display;
use thiserror::Error;

use crate::model::RawValue;

/// ATM controller error type
#[derive(Debug, Error)]
pub enum Error {
    /// A raw value was rejected by its validation rule
    #[error("Invalid {field} format/type: {value}")]
    InvalidValue {
        /// Which value object rejected the input ("pin", "account id")
        field: &'static str,
        /// The rejected raw value
        value: RawValue,
    },

    /// A validation rule could not be built or is unusable
    #[error("Invalid validation rule: {0}")]
    InvalidValidationRule(String),

    /// An account identifier was built from something other than a valid pin
    #[error("Invalid pin number format/type: {0}")]
    InvalidPin(RawValue),

    /// A controller operation received an argument of the wrong kind
    #[error("Invalid '{param}' param. This param must be '{expected}'")]
    InputType {
        param: &'static str,
        expected: &'static str,
    },

    /// A backend query primitive returned a value violating its contract
    #[error("Invalid '{primitive}' result. This query must return '{expected}'")]
    QueryContract {
        primitive: &'static str,
        expected: &'static str,
    },

    /// A domain rule was violated (negative amount, insufficient balance)
    #[error("Business rule violated: {0}")]
    BusinessRule(String),

    /// Failure raised by a storage backend while serving a query
    #[error("Backend error: {0}")]
    Backend(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a business rule violation
    pub fn business_rule(reason: impl Into<String>) -> Self {
        Error::BusinessRule(reason.into())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait to add context to error results
pub trait ErrorExt<T> {
    /// Add context information to an error
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display;
}

impl<T> ErrorExt<T> for Result<T> {
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display,
    {
        self.map_err(|e| {
            let context = context_fn().to_string();
            match e {
                Error::BusinessRule(msg) => Error::BusinessRule(format!("{}: {}", context, msg)),
                Error::Backend(msg) => Error::Backend(format!("{}: {}", context, msg)),
                Error::InvalidValidationRule(msg) => {
                    Error::InvalidValidationRule(format!("{}: {}", context, msg))
                }
                Error::ConfigurationError(msg) => {
                    Error::ConfigurationError(format!("{}: {}", context, msg))
                }
                // Structured variants are matched on by callers; keep them intact.
                other => other,
            }
        })
    }
}
