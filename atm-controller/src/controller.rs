//! ATM controller
//!
//! The controller performs the functions of an ATM:
//! - receive a pin and look up the accounts registered under it
//! - report the balance of an account
//! - deposit to or withdraw from an account
//!
//! It never touches storage itself. Every read and write goes through the
//! three primitives of an [`AccountQueries`] backend, and every backend
//! result is checked against the primitive's contract before it is used.

use atm_common::error::{Error, ErrorExt, Result};
use atm_common::{AccountIdentifier, Amount, RawValue, ValidatedPin};
use tracing::{debug, info, warn};

use crate::repository::AccountQueries;

/// ATM controller bound to a storage backend
#[derive(Debug, Clone)]
pub struct AtmController<Q> {
    /// Backend serving the query primitives
    queries: Q,
}

impl<Q: AccountQueries> AtmController<Q> {
    /// Create a controller over `queries`
    pub fn new(queries: Q) -> Self {
        Self { queries }
    }

    /// The backend this controller delegates to
    pub fn queries(&self) -> &Q {
        &self.queries
    }

    /// Look up every account registered under `pin`
    ///
    /// An unknown pin yields an empty list. Each raw id the backend returns
    /// must pass the default account id rule.
    pub fn find_accounts(&self, pin: &ValidatedPin) -> Result<Vec<AccountIdentifier>> {
        debug!("Finding accounts for {}", pin);

        let ids = match self.queries.find_accounts_query(pin.raw_value())? {
            RawValue::Array(ids) => ids,
            other => {
                warn!("find_accounts_query returned a non-array value: {}", other);
                return Err(Error::QueryContract {
                    primitive: "find_accounts_query",
                    expected: "array of account ids",
                });
            }
        };

        ids.into_iter()
            .map(|id| AccountIdentifier::new(pin, id))
            .collect()
    }

    /// Balance of `account`, or `None` when the backend does not know it
    pub fn get_balance(&self, account: &AccountIdentifier) -> Result<Option<Amount>> {
        let (pin, account_id) = account.items();
        let result = self.queries.get_balance_query(pin, account_id)?;

        match result {
            RawValue::Null => {
                debug!("No balance for {}", account);
                Ok(None)
            }
            RawValue::Number(ref n) if n.is_i64() => Ok(n.as_i64()),
            other => {
                warn!("get_balance_query returned a non-integer value: {}", other);
                Err(Error::QueryContract {
                    primitive: "get_balance_query",
                    expected: "integer or null",
                })
            }
        }
    }

    /// Add `amount` to the balance of `account`
    ///
    /// A zero amount is accepted and leaves the balance unchanged.
    pub fn deposit(&self, account: &AccountIdentifier, amount: Amount) -> Result<()> {
        ensure_non_negative(amount)?;
        info!("Depositing {} to {}", amount, account);

        let (pin, account_id) = account.items();
        self.queries
            .update_balance_query(pin, account_id, amount)
            .with_context(|| format!("Failed to deposit {} to {}", amount, account))
    }

    /// Remove `amount` from the balance of `account`
    ///
    /// Fails with [`Error::BusinessRule`] when the account is unknown or holds
    /// less than `amount`; the balance is left untouched in that case. The
    /// balance check and the update are two separate backend calls.
    pub fn withdraw(&self, account: &AccountIdentifier, amount: Amount) -> Result<()> {
        ensure_non_negative(amount)?;
        info!("Withdrawing {} from {}", amount, account);

        let balance = self
            .get_balance(account)?
            .ok_or_else(|| Error::business_rule(format!("account not found: {}", account)))?;

        if amount > balance {
            return Err(Error::business_rule(format!(
                "insufficient balance: cannot withdraw {} from {} holding {}",
                amount, account, balance
            )));
        }

        let (pin, account_id) = account.items();
        self.queries
            .update_balance_query(pin, account_id, -amount)
            .with_context(|| format!("Failed to withdraw {} from {}", amount, account))
    }

    /// Move `amount` from one account to another
    ///
    /// Nothing is deposited if the withdrawal fails. The two steps are not
    /// atomic at this layer.
    pub fn transfer(&self, from: &AccountIdentifier, to: &AccountIdentifier, amount: Amount) -> Result<()> {
        debug!("Transferring {} from {} to {}", amount, from, to);
        self.withdraw(from, amount)?;
        self.deposit(to, amount)
    }
}

fn ensure_non_negative(amount: Amount) -> Result<()> {
    if amount < 0 {
        return Err(Error::business_rule(format!(
            "negative amount: {} cannot be moved",
            amount
        )));
    }
    Ok(())
}
