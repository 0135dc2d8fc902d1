//! ATM controller delegating account storage to a pluggable backend

pub mod controller;
pub mod repository;
pub mod config;
pub mod script;

pub use controller::AtmController;
pub use repository::{AccountQueries, CashRecord, InMemoryCashBin};
pub use config::AtmControllerConfig;
pub use script::{load_script, run_script, ScriptStep, StepOutcome};
