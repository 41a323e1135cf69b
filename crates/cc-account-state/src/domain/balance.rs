//! # Account Balance Entities
//!
//! One [`AccountBalance`] per (account, asset) pair actually held, plus the
//! per-account [`CycleBalance`] consumed by the license subsystem.
//!
//! Balances are enumerable per asset from largest to smallest holder with a
//! deterministic tie-break, so that forced-settlement passes over one asset
//! (a black-swan haircut) are reproducible across implementations; see
//! [`AccountBalance::enumeration_key`].

use serde::{Deserialize, Serialize};
use shared_types::{AccountId, Amount, Asset, AssetId, AssetReserved};
use std::cmp::Reverse;

use super::errors::StateError;

/// Funds of a single account in a single asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub owner: AccountId,
    pub asset_type: AssetId,

    /// Available funds.
    pub balance: Amount,

    /// Funds set aside; not spendable and not part of `balance`.
    pub reserved: Amount,

    /// Amount spent inside the current limiting interval. Reset at interval
    /// boundaries by the maintenance driver.
    pub spent: Amount,

    /// Spending ceiling for the current interval, in reference currency.
    pub eur_limit: Amount,

    /// Spending ceiling for the current interval, in this asset.
    pub limit: Amount,
}

impl AccountBalance {
    pub fn new(owner: AccountId, asset_type: AssetId) -> Self {
        Self {
            owner,
            asset_type,
            balance: 0,
            reserved: 0,
            spent: 0,
            eur_limit: 0,
            limit: 0,
        }
    }

    pub fn get_balance(&self) -> Asset {
        Asset::new(self.balance, self.asset_type)
    }

    pub fn get_reserved_balance(&self) -> Asset {
        Asset::new(self.reserved, self.asset_type)
    }

    pub fn get_asset_reserved_balance(&self) -> AssetReserved {
        AssetReserved {
            amount: self.balance,
            reserved: self.reserved,
            asset_id: self.asset_type,
        }
    }

    pub fn get_spent_balance(&self) -> Asset {
        Asset::new(self.spent, self.asset_type)
    }

    pub fn get_limit(&self) -> Asset {
        Asset::new(self.limit, self.asset_type)
    }

    /// The only mutator of `balance`.
    ///
    /// Rejects a delta in a different asset, and any delta whose result
    /// would be negative; on rejection the balance is untouched.
    pub fn adjust_balance(&mut self, delta: Asset) -> Result<(), StateError> {
        if delta.asset_id != self.asset_type {
            return Err(StateError::AssetTypeMismatch {
                expected: self.asset_type,
                actual: delta.asset_id,
            });
        }
        if self.balance + delta.amount < 0 {
            return Err(StateError::NegativeBalance {
                owner: self.owner,
                asset: self.asset_type,
                balance: self.balance,
                delta: delta.amount,
            });
        }
        self.balance += delta.amount;
        Ok(())
    }

    /// Adjust the reserved portion, with the same asset and non-negativity
    /// guards as [`adjust_balance`](Self::adjust_balance).
    pub fn adjust_reserved(&mut self, delta: Asset) -> Result<(), StateError> {
        if delta.asset_id != self.asset_type {
            return Err(StateError::AssetTypeMismatch {
                expected: self.asset_type,
                actual: delta.asset_id,
            });
        }
        if self.reserved + delta.amount < 0 {
            return Err(StateError::NegativeReserved {
                owner: self.owner,
                asset: self.asset_type,
                reserved: self.reserved,
                delta: delta.amount,
            });
        }
        self.reserved += delta.amount;
        Ok(())
    }

    /// Accumulate spending inside the current limit interval. Enforcement of
    /// the ceiling is the limit subsystem's call.
    pub fn record_spent(&mut self, amount: Amount) -> Result<(), StateError> {
        if amount <= 0 {
            return Err(StateError::NonPositiveAmount { amount });
        }
        self.spent += amount;
        Ok(())
    }

    /// Interval boundary: the maintenance driver starts a fresh interval.
    pub fn reset_spent(&mut self) {
        self.spent = 0;
    }

    pub fn set_limits(&mut self, limit: Amount, eur_limit: Amount) {
        self.limit = limit;
        self.eur_limit = eur_limit;
    }

    /// Key under which this balance appears in the per-asset enumeration:
    /// asset ascending, then balance descending, then owner ascending.
    pub fn enumeration_key(&self) -> (AssetId, Reverse<Amount>, AccountId) {
        (self.asset_type, Reverse(self.balance), self.owner)
    }
}

/// Cycle balance of a single account, granted by its licenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleBalance {
    pub owner: AccountId,
    pub balance: Amount,
}

impl CycleBalance {
    pub fn new(owner: AccountId) -> Self {
        Self { owner, balance: 0 }
    }

    pub fn get_balance(&self) -> Amount {
        self.balance
    }

    pub fn adjust(&mut self, delta: Amount) -> Result<(), StateError> {
        if self.balance + delta < 0 {
            return Err(StateError::NegativeCycleBalance {
                owner: self.owner,
                balance: self.balance,
                delta,
            });
        }
        self.balance += delta;
        Ok(())
    }
}
