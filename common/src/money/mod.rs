//! Amount type utilities for balance arithmetic

use crate::error::{Error, Result};
use crate::model::RawValue;

/// Whole-unit amount of money moved in or out of an account
pub type Amount = i64;

/// Convert a raw value into an [`Amount`].
///
/// Only integers representable as `i64` are accepted. Floats, numeric
/// strings and anything else fail with [`Error::InputType`].
pub fn amount_from_raw(raw: &RawValue) -> Result<Amount> {
    raw.as_i64().ok_or(Error::InputType {
        param: "amount",
        expected: "integer",
    })
}
