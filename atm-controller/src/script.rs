//! Scripted sequences of ATM operations
//!
//! A script is a JSON array of steps, e.g.
//!
//! ```json
//! [
//!   {"op": "balance", "pin": "00-01", "account": "shino1025"},
//!   {"op": "transfer", "pin": "00-01", "from": "shino1025", "to": "shino102566", "amount": 30}
//! ]
//! ```
//!
//! Pins and account ids go through the same rules as interactive input, and
//! amounts are raw values that must be integers.

use std::path::Path;

use atm_common::error::{Error, ErrorExt, Result};
use atm_common::{amount_from_raw, AccountIdentifier, Amount, RawValue, ValidatedPin, ValidationRule};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::controller::AtmController;
use crate::repository::AccountQueries;

/// One operation in a script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    Balance {
        pin: RawValue,
        account: RawValue,
    },
    Deposit {
        pin: RawValue,
        account: RawValue,
        amount: RawValue,
    },
    Withdraw {
        pin: RawValue,
        account: RawValue,
        amount: RawValue,
    },
    Transfer {
        pin: RawValue,
        from: RawValue,
        to: RawValue,
        amount: RawValue,
    },
}

/// Result of an executed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StepOutcome {
    Balance {
        account: AccountIdentifier,
        balance: Option<Amount>,
    },
    Deposit {
        account: AccountIdentifier,
        amount: Amount,
    },
    Withdraw {
        account: AccountIdentifier,
        amount: Amount,
    },
    Transfer {
        from: AccountIdentifier,
        to: AccountIdentifier,
        amount: Amount,
    },
}

/// Read a script from a JSON file
pub fn load_script(path: impl AsRef<Path>) -> Result<Vec<ScriptStep>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::ConfigurationError(format!("Cannot read script {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Execute `steps` in order, stopping at the first failure
///
/// Pins are validated with `pin_rule` and account ids with `account_rule`.
/// The error names the failing step (1-based) where the error kind carries
/// a message.
pub fn run_script<Q, R, A>(
    controller: &AtmController<Q>,
    pin_rule: &R,
    account_rule: &A,
    steps: impl IntoIterator<Item = ScriptStep>,
) -> Result<Vec<StepOutcome>>
where
    Q: AccountQueries,
    R: ValidationRule + ?Sized,
    A: ValidationRule + ?Sized,
{
    let rules = Rules { pin: pin_rule, account: account_rule };
    let mut outcomes = Vec::new();
    for (index, step) in steps.into_iter().enumerate() {
        debug!("Running script step {}: {:?}", index + 1, step);
        let outcome = run_step(controller, &rules, step)
            .with_context(|| format!("step {}", index + 1))?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

struct Rules<'a, R: ?Sized, A: ?Sized> {
    pin: &'a R,
    account: &'a A,
}

impl<R, A> Rules<'_, R, A>
where
    R: ValidationRule + ?Sized,
    A: ValidationRule + ?Sized,
{
    fn pin(&self, pin: RawValue) -> Result<ValidatedPin> {
        ValidatedPin::with_rule(pin, self.pin)
    }

    fn account(&self, pin: &ValidatedPin, account: RawValue) -> Result<AccountIdentifier> {
        AccountIdentifier::with_rule(pin, account, self.account)
    }
}

fn run_step<Q, R, A>(controller: &AtmController<Q>, rules: &Rules<'_, R, A>, step: ScriptStep) -> Result<StepOutcome>
where
    Q: AccountQueries,
    R: ValidationRule + ?Sized,
    A: ValidationRule + ?Sized,
{
    match step {
        ScriptStep::Balance { pin, account } => {
            let account = rules.account(&rules.pin(pin)?, account)?;
            let balance = controller.get_balance(&account)?;
            Ok(StepOutcome::Balance { account, balance })
        }
        ScriptStep::Deposit { pin, account, amount } => {
            let amount = amount_from_raw(&amount)?;
            let account = rules.account(&rules.pin(pin)?, account)?;
            controller.deposit(&account, amount)?;
            Ok(StepOutcome::Deposit { account, amount })
        }
        ScriptStep::Withdraw { pin, account, amount } => {
            let amount = amount_from_raw(&amount)?;
            let account = rules.account(&rules.pin(pin)?, account)?;
            controller.withdraw(&account, amount)?;
            Ok(StepOutcome::Withdraw { account, amount })
        }
        ScriptStep::Transfer { pin, from, to, amount } => {
            let amount = amount_from_raw(&amount)?;
            let pin = rules.pin(pin)?;
            let from = rules.account(&pin, from)?;
            let to = rules.account(&pin, to)?;
            controller.transfer(&from, &to, amount)?;
            Ok(StepOutcome::Transfer { from, to, amount })
        }
    }
}
