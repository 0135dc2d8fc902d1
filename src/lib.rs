// This is a metapackage for tests
// Re-export crates as modules

pub use atm_common as common;
pub use atm_controller as controller;
