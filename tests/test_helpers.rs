// File: tests/test_helpers.rs

#![allow(dead_code)]

use std::sync::Arc;

use simple_atm_tests::common::{AccountIdentifier, PatternRule, ValidatedPin};
use simple_atm_tests::controller::{AtmController, InMemoryCashBin};

/// Pin format used by the demo records
pub const PIN_PATTERN: &str = r"\d{2}-\d{2}";

/// Controller over a fresh demo cash bin; the bin handle is shared so tests can inspect it
pub fn demo_controller() -> AtmController<Arc<InMemoryCashBin>> {
    AtmController::new(Arc::new(InMemoryCashBin::demo()))
}

/// Pin validated with the demo pin format
pub fn demo_pin(raw: &str) -> ValidatedPin {
    let rule = PatternRule::new(PIN_PATTERN).expect("demo pin pattern compiles");
    ValidatedPin::with_rule(raw, &rule).expect("demo pin is well formed")
}

/// First account registered under `pin`
pub fn first_account(controller: &AtmController<Arc<InMemoryCashBin>>, pin: &str) -> AccountIdentifier {
    controller
        .find_accounts(&demo_pin(pin))
        .expect("lookup succeeds")
        .into_iter()
        .next()
        .expect("pin has at least one account")
}
