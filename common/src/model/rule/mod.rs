//! Validation rules for raw pins and account ids
//!
//! A rule is any type implementing [`ValidationRule`]. Callers plug their
//! own rules into [`ValidatedPin`](crate::model::pin::ValidatedPin) and
//! [`AccountIdentifier`](crate::model::account::AccountIdentifier); the
//! [`DefaultRule`] below is a good example.

use std::fmt;

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::RawValue;

/// Predicate deciding whether a raw value is acceptable
pub trait ValidationRule {
    /// Return `true` to accept `raw`
    fn validate(&self, raw: &RawValue) -> bool;
}

impl<R: ValidationRule + ?Sized> ValidationRule for &R {
    fn validate(&self, raw: &RawValue) -> bool {
        (**self).validate(raw)
    }
}

impl<R: ValidationRule + ?Sized> ValidationRule for Box<R> {
    fn validate(&self, raw: &RawValue) -> bool {
        (**self).validate(raw)
    }
}

/// Accepts any string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultRule;

impl ValidationRule for DefaultRule {
    fn validate(&self, raw: &RawValue) -> bool {
        raw.is_string()
    }
}

/// Accepts strings containing a match of a regular expression
///
/// The pattern is searched for anywhere in the value; anchor it with `^`/`$`
/// to require a full match.
#[derive(Debug, Clone)]
pub struct PatternRule {
    regex: Regex,
}

impl PatternRule {
    /// Compile `pattern` into a rule
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            Error::InvalidValidationRule(format!("pattern '{}' does not compile: {}", pattern, e))
        })?;
        Ok(Self { regex })
    }

    /// The source pattern
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

impl ValidationRule for PatternRule {
    fn validate(&self, raw: &RawValue) -> bool {
        raw.as_str().is_some_and(|s| self.regex.is_match(s))
    }
}

/// Adapts a closure into a rule
#[derive(Clone, Copy)]
pub struct FnRule<F>(pub F);

impl<F> FnRule<F>
where
    F: Fn(&RawValue) -> bool,
{
    pub fn new(predicate: F) -> Self {
        Self(predicate)
    }
}

impl<F> ValidationRule for FnRule<F>
where
    F: Fn(&RawValue) -> bool,
{
    fn validate(&self, raw: &RawValue) -> bool {
        (self.0)(raw)
    }
}

impl<F> fmt::Debug for FnRule<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnRule(..)")
    }
}

/// Run `rule` over `raw`, handing the value back when it is accepted
pub(crate) fn check<R>(field: &'static str, raw: RawValue, rule: &R) -> Result<RawValue>
where
    R: ValidationRule + ?Sized,
{
    if rule.validate(&raw) {
        Ok(raw)
    } else {
        Err(Error::InvalidValue { field, value: raw })
    }
}
