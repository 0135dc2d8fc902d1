//! Backend contract and the in-memory cash bin

use std::path::Path;
use std::sync::Arc;

use atm_common::error::{Error, Result};
use atm_common::{Amount, RawValue};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Query primitives a storage backend supplies to the controller.
///
/// The controller checks every result against the contract documented on
/// each method and reports violations as [`Error::QueryContract`].
pub trait AccountQueries {
    /// Raw ids of every account registered under `pin`, as an array
    fn find_accounts_query(&self, pin: &RawValue) -> Result<RawValue>;

    /// Balance of the account as an integer, or `null` when it does not exist
    fn get_balance_query(&self, pin: &RawValue, account_id: &RawValue) -> Result<RawValue>;

    /// Add `delta` (possibly negative) to the account's balance
    fn update_balance_query(&self, pin: &RawValue, account_id: &RawValue, delta: Amount) -> Result<()>;
}

impl<T: AccountQueries + ?Sized> AccountQueries for &T {
    fn find_accounts_query(&self, pin: &RawValue) -> Result<RawValue> {
        (**self).find_accounts_query(pin)
    }

    fn get_balance_query(&self, pin: &RawValue, account_id: &RawValue) -> Result<RawValue> {
        (**self).get_balance_query(pin, account_id)
    }

    fn update_balance_query(&self, pin: &RawValue, account_id: &RawValue, delta: Amount) -> Result<()> {
        (**self).update_balance_query(pin, account_id, delta)
    }
}

impl<T: AccountQueries + ?Sized> AccountQueries for Box<T> {
    fn find_accounts_query(&self, pin: &RawValue) -> Result<RawValue> {
        (**self).find_accounts_query(pin)
    }

    fn get_balance_query(&self, pin: &RawValue, account_id: &RawValue) -> Result<RawValue> {
        (**self).get_balance_query(pin, account_id)
    }

    fn update_balance_query(&self, pin: &RawValue, account_id: &RawValue, delta: Amount) -> Result<()> {
        (**self).update_balance_query(pin, account_id, delta)
    }
}

impl<T: AccountQueries + ?Sized> AccountQueries for Arc<T> {
    fn find_accounts_query(&self, pin: &RawValue) -> Result<RawValue> {
        (**self).find_accounts_query(pin)
    }

    fn get_balance_query(&self, pin: &RawValue, account_id: &RawValue) -> Result<RawValue> {
        (**self).get_balance_query(pin, account_id)
    }

    fn update_balance_query(&self, pin: &RawValue, account_id: &RawValue, delta: Amount) -> Result<()> {
        (**self).update_balance_query(pin, account_id, delta)
    }
}

/// One row of the cash bin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashRecord {
    pub pin: String,
    pub account_id: String,
    pub balance: Amount,
}

impl CashRecord {
    pub fn new(pin: impl Into<String>, account_id: impl Into<String>, balance: Amount) -> Self {
        Self {
            pin: pin.into(),
            account_id: account_id.into(),
            balance,
        }
    }
}

/// Registered account under a pin
#[derive(Debug, Clone)]
struct Slot {
    account_id: String,
    balance: Amount,
}

/// In-memory cash bin keyed by pin
///
/// Accounts under one pin keep their registration order. Every update goes
/// through the map's per-entry write guard, so concurrent updates to the same
/// pin are serialized.
pub struct InMemoryCashBin {
    /// Accounts by pin
    accounts: DashMap<String, Vec<Slot>>,
}

impl InMemoryCashBin {
    /// Create an empty cash bin
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Create a cash bin holding `records`
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = CashRecord>,
    {
        let bin = Self::new();
        for record in records {
            bin.insert(record);
        }
        bin
    }

    /// Cash bin seeded with the demo records
    pub fn demo() -> Self {
        Self::from_records([
            CashRecord::new("00-00", "shin10256", 0),
            CashRecord::new("00-01", "shino1025", 73),
            CashRecord::new("00-01", "shino102566", 23),
            CashRecord::new("00-02", "iml1111", 100_000),
            CashRecord::new("00-03", "imiml", 2312),
        ])
    }

    /// Load records from a JSON array file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigurationError(format!("Cannot read seed file {}: {}", path.display(), e))
        })?;
        let records: Vec<CashRecord> = serde_json::from_str(&content)?;
        info!("Loaded {} cash bin records from {}", records.len(), path.display());
        Ok(Self::from_records(records))
    }

    /// Register an account, replacing the balance if it already exists
    pub fn insert(&self, record: CashRecord) {
        let mut slots = self.accounts.entry(record.pin).or_default();
        match slots.iter_mut().find(|s| s.account_id == record.account_id) {
            Some(slot) => slot.balance = record.balance,
            None => slots.push(Slot {
                account_id: record.account_id,
                balance: record.balance,
            }),
        }
    }

    /// Snapshot of every record, ordered by pin then registration order
    pub fn records(&self) -> Vec<CashRecord> {
        let mut records: Vec<CashRecord> = self
            .accounts
            .iter()
            .flat_map(|entry| {
                let pin = entry.key().clone();
                entry
                    .value()
                    .iter()
                    .map(|slot| CashRecord::new(pin.clone(), slot.account_id.clone(), slot.balance))
                    .collect::<Vec<_>>()
            })
            .collect();
        // Stable sort keeps registration order within a pin.
        records.sort_by(|a, b| a.pin.cmp(&b.pin));
        records
    }

    /// Number of registered accounts
    pub fn len(&self) -> usize {
        self.accounts.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryCashBin {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountQueries for InMemoryCashBin {
    fn find_accounts_query(&self, pin: &RawValue) -> Result<RawValue> {
        let ids = pin
            .as_str()
            .and_then(|pin| self.accounts.get(pin))
            .map(|slots| {
                slots
                    .iter()
                    .map(|slot| RawValue::from(slot.account_id.as_str()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(RawValue::Array(ids))
    }

    fn get_balance_query(&self, pin: &RawValue, account_id: &RawValue) -> Result<RawValue> {
        let (Some(pin), Some(account_id)) = (pin.as_str(), account_id.as_str()) else {
            return Ok(RawValue::Null);
        };
        let balance = self.accounts.get(pin).and_then(|slots| {
            slots
                .iter()
                .find(|slot| slot.account_id == account_id)
                .map(|slot| slot.balance)
        });
        Ok(balance.map(RawValue::from).unwrap_or(RawValue::Null))
    }

    fn update_balance_query(&self, pin: &RawValue, account_id: &RawValue, delta: Amount) -> Result<()> {
        let (Some(pin), Some(account_id)) = (pin.as_str(), account_id.as_str()) else {
            debug!("Ignoring update for non-text key ({}, {})", pin, account_id);
            return Ok(());
        };
        let Some(mut slots) = self.accounts.get_mut(pin) else {
            debug!("Ignoring update for unknown pin {}", pin);
            return Ok(());
        };
        match slots.iter_mut().find(|slot| slot.account_id == account_id) {
            Some(slot) => {
                slot.balance = slot.balance.checked_add(delta).ok_or_else(|| {
                    Error::Backend(format!("Balance overflow for account {}", account_id))
                })?;
                debug!("Balance of {}/{} is now {}", pin, account_id, slot.balance);
            }
            None => debug!("Ignoring update for unknown account {}/{}", pin, account_id),
        }
        Ok(())
    }
}
