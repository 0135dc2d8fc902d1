//! Account identifier bound to the PIN it was validated under

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::pin::ValidatedPin;
use crate::model::rule::{self, DefaultRule, ValidationRule};
use crate::model::RawValue;

/// Account id plus a copy of the owning PIN's raw value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AccountRecord")]
pub struct AccountIdentifier {
    /// Raw value of the owning PIN (copied, not a live reference)
    pin: RawValue,
    /// Raw account id
    account_id: RawValue,
}

/// Unchecked wire shape of an [`AccountIdentifier`]
#[derive(Debug, Clone, Deserialize)]
pub struct AccountRecord {
    pub pin: RawValue,
    pub account_id: RawValue,
}

impl AccountIdentifier {
    /// Validate `account_id` with the [`DefaultRule`]
    pub fn new(pin: &ValidatedPin, account_id: impl Into<RawValue>) -> Result<Self> {
        Self::with_rule(pin, account_id, &DefaultRule)
    }

    /// Validate `account_id` with a caller-supplied rule
    pub fn with_rule<R>(pin: &ValidatedPin, account_id: impl Into<RawValue>, rule: &R) -> Result<Self>
    where
        R: ValidationRule + ?Sized,
    {
        let account_id = rule::check("account id", account_id.into(), rule)?;
        Ok(Self {
            pin: pin.raw_value().clone(),
            account_id,
        })
    }

    /// Build from an unchecked pin and account id.
    ///
    /// The pin is validated with the default rule first; if it is rejected the
    /// account id is never looked at and [`Error::InvalidPin`] is returned.
    pub fn from_raw(pin: impl Into<RawValue>, account_id: impl Into<RawValue>) -> Result<Self> {
        let pin = ValidatedPin::new(pin).map_err(|e| match e {
            Error::InvalidValue { value, .. } => Error::InvalidPin(value),
            other => other,
        })?;
        Self::new(&pin, account_id)
    }

    /// Raw value of the owning PIN
    pub fn pin(&self) -> &RawValue {
        &self.pin
    }

    /// Raw account id
    pub fn account_id(&self) -> &RawValue {
        &self.account_id
    }

    /// `(pin, account_id)`, the argument pair every backend query takes
    pub fn items(&self) -> (&RawValue, &RawValue) {
        (&self.pin, &self.account_id)
    }

    /// Whether this account was validated under `pin`
    pub fn belongs_to(&self, pin: &ValidatedPin) -> bool {
        &self.pin == pin.raw_value()
    }
}

impl TryFrom<AccountRecord> for AccountIdentifier {
    type Error = Error;

    fn try_from(record: AccountRecord) -> Result<Self> {
        Self::from_raw(record.pin, record.account_id)
    }
}

impl fmt::Display for AccountIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account(pin={}, account_id={})", Bare(&self.pin), Bare(&self.account_id))
    }
}

/// Strings without their JSON quotes, anything else as JSON
struct Bare<'a>(&'a RawValue);

impl fmt::Display for Bare<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_str() {
            Some(text) => f.write_str(text),
            None => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rule::FnRule;
    use serde_json::json;

    fn pin() -> ValidatedPin {
        ValidatedPin::new("0000-0001").unwrap()
    }

    #[test]
    fn test_allocate_account_id() {
        let account = AccountIdentifier::new(&pin(), "IML").unwrap();
        assert_eq!(account.pin(), &json!("0000-0001"));
        assert_eq!(account.account_id(), &json!("IML"));
        assert_eq!(account.items(), (&json!("0000-0001"), &json!("IML")));
        assert!(account.belongs_to(&pin()));
        assert_eq!(account.to_string(), "Account(pin=0000-0001, account_id=IML)");
    }

    #[test]
    fn test_display_keeps_non_string_ids_as_json() {
        let numeric = FnRule::new(|value: &RawValue| value.is_u64());
        let account = AccountIdentifier::with_rule(&pin(), 42, &numeric).unwrap();
        assert_eq!(account.to_string(), "Account(pin=0000-0001, account_id=42)");
    }

    #[test]
    fn test_from_raw_checks_pin_first() {
        // Both values are invalid; the pin must be the one reported.
        match AccountIdentifier::from_raw(7, 8) {
            Err(Error::InvalidPin(value)) => assert_eq!(value, json!(7)),
            other => panic!("Expected InvalidPin, got {:?}", other),
        }

        match AccountIdentifier::from_raw("00-01", 8) {
            Err(Error::InvalidValue { field: "account id", .. }) => (),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_serde_round_trip_and_revalidation() {
        let account = AccountIdentifier::new(&pin(), "IML").unwrap();
        let encoded = serde_json::to_value(&account).unwrap();
        assert_eq!(encoded, json!({"pin": "0000-0001", "account_id": "IML"}));

        let decoded: AccountIdentifier = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, account);

        let tampered = json!({"pin": 1, "account_id": "IML"});
        assert!(serde_json::from_value::<AccountIdentifier>(tampered).is_err());
    }
}
