//! Configuration for the ATM controller

use std::env;
use std::path::PathBuf;

use atm_common::error::{ErrorExt, Result};
use atm_common::{DefaultRule, PatternRule, ValidationRule};

use crate::repository::InMemoryCashBin;

/// Configuration for the ATM controller and its demo cash bin
#[derive(Debug, Clone)]
pub struct AtmControllerConfig {
    /// Regex a pin must contain; `None` accepts any text pin
    pub pin_pattern: Option<String>,
    /// Regex an account id must contain; `None` accepts any text id
    pub account_id_pattern: Option<String>,
    /// JSON file with the cash bin records; `None` uses the demo records
    pub seed_file: Option<PathBuf>,
    /// Log level for the demo binary
    pub log_level: String,
}

impl Default for AtmControllerConfig {
    fn default() -> Self {
        Self {
            pin_pattern: non_empty_var("ATM_PIN_PATTERN"),
            account_id_pattern: non_empty_var("ATM_ACCOUNT_ID_PATTERN"),
            seed_file: non_empty_var("ATM_SEED_FILE").map(PathBuf::from),
            log_level: env::var("ATM_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl AtmControllerConfig {
    /// Create a new configuration using environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create a new configuration with custom values
    pub fn new(
        pin_pattern: Option<String>,
        account_id_pattern: Option<String>,
        seed_file: Option<PathBuf>,
        log_level: String,
    ) -> Self {
        Self {
            pin_pattern,
            account_id_pattern,
            seed_file,
            log_level,
        }
    }

    /// Rule pins are validated with
    pub fn pin_rule(&self) -> Result<Box<dyn ValidationRule>> {
        build_rule(self.pin_pattern.as_deref()).with_context(|| "ATM_PIN_PATTERN")
    }

    /// Rule account ids are validated with
    pub fn account_id_rule(&self) -> Result<Box<dyn ValidationRule>> {
        build_rule(self.account_id_pattern.as_deref()).with_context(|| "ATM_ACCOUNT_ID_PATTERN")
    }

    /// Cash bin loaded from the seed file, or the demo records
    pub fn cash_bin(&self) -> Result<InMemoryCashBin> {
        match &self.seed_file {
            Some(path) => InMemoryCashBin::load(path),
            None => Ok(InMemoryCashBin::demo()),
        }
    }
}

fn build_rule(pattern: Option<&str>) -> Result<Box<dyn ValidationRule>> {
    Ok(match pattern {
        Some(pattern) => Box::new(PatternRule::new(pattern)?),
        None => Box::new(DefaultRule),
    })
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
