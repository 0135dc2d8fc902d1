//! Validated PIN value object

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::rule::{self, DefaultRule, ValidationRule};
use crate::model::RawValue;

/// A PIN that some validation rule has accepted
///
/// The only way to obtain one is through [`ValidatedPin::new`] or
/// [`ValidatedPin::with_rule`] (or deserialization, which runs the default
/// rule), so holding a `ValidatedPin` is proof the raw value was checked.
///
/// Deserialization has no way to learn which rule built the original, so it
/// always applies [`DefaultRule`]. A pin accepted by a custom rule that is not
/// a string serializes fine but will not deserialize back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawValue", into = "RawValue")]
pub struct ValidatedPin {
    raw_value: RawValue,
}

impl ValidatedPin {
    /// Validate `raw` with the [`DefaultRule`]
    pub fn new(raw: impl Into<RawValue>) -> Result<Self> {
        Self::with_rule(raw, &DefaultRule)
    }

    /// Validate `raw` with a caller-supplied rule
    pub fn with_rule<R>(raw: impl Into<RawValue>, rule: &R) -> Result<Self>
    where
        R: ValidationRule + ?Sized,
    {
        let raw_value = rule::check("pin", raw.into(), rule)?;
        Ok(Self { raw_value })
    }

    /// The validated raw PIN
    pub fn raw_value(&self) -> &RawValue {
        &self.raw_value
    }
}

impl TryFrom<RawValue> for ValidatedPin {
    type Error = Error;

    fn try_from(raw: RawValue) -> Result<Self> {
        Self::new(raw)
    }
}

impl From<ValidatedPin> for RawValue {
    fn from(pin: ValidatedPin) -> Self {
        pin.raw_value
    }
}

impl fmt::Display for ValidatedPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.raw_value.as_str() {
            Some(pin) => write!(f, "Pin({})", pin),
            None => write!(f, "Pin({})", self.raw_value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rule::FnRule;
    use serde_json::json;

    #[test]
    fn test_allocate_pin() {
        let pin = ValidatedPin::new("0000-0001").unwrap();
        assert_eq!(pin.raw_value(), &json!("0000-0001"));
        assert_eq!(pin.to_string(), "Pin(0000-0001)");
    }

    #[test]
    fn test_rejected_pin_keeps_raw_value() {
        match ValidatedPin::new(1) {
            Err(Error::InvalidValue { field: "pin", value }) => assert_eq!(value, json!(1)),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_rule_overrides_default() {
        let any_number = FnRule::new(|raw: &RawValue| raw.is_number());
        assert!(ValidatedPin::with_rule(1234, &any_number).is_ok());
        assert!(ValidatedPin::with_rule("1234", &any_number).is_err());
    }

    #[test]
    fn test_serde_revalidates() {
        let pin: ValidatedPin = serde_json::from_str("\"00-01\"").unwrap();
        assert_eq!(serde_json::to_string(&pin).unwrap(), "\"00-01\"");

        let rejected = serde_json::from_str::<ValidatedPin>("42");
        assert!(rejected.is_err());
    }

    #[test]
    fn test_custom_rule_pin_does_not_deserialize_back() {
        let any_number = FnRule::new(|raw: &RawValue| raw.is_number());
        let pin = ValidatedPin::with_rule(1234, &any_number).unwrap();

        let encoded = serde_json::to_value(&pin).unwrap();
        assert_eq!(encoded, json!(1234));
        assert!(serde_json::from_value::<ValidatedPin>(encoded).is_err());
    }
}
