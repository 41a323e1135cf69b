//! # Account Statistics Entity
//!
//! Regularly-updated counters split out from [`Account`] so that the undo
//! history of fee- and order-heavy traffic stays small: a transfer touches
//! this record, not the account itself.
//!
//! [`Account`]: crate::domain::entities::Account

use serde::{Deserialize, Serialize};
use shared_types::{AccountId, Amount, OperationHistoryId};

use super::errors::StateError;

/// One record per account, addressed by its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatistics {
    pub owner: AccountId,

    /// Head of the reverse-chronological transaction-history chain. The
    /// chain nodes themselves are stored externally; only the head pointer
    /// and count are kept here.
    pub most_recent_op: Option<OperationHistoryId>,
    pub total_ops: u32,

    /// Running total of core-asset value locked in open orders. Updated
    /// incrementally by order lifecycle events, never recomputed by
    /// scanning.
    pub total_core_in_orders: Amount,

    /// Total fees this account has ever paid. Monotonically increasing.
    pub lifetime_fees_paid: Amount,

    /// Fees accumulated since the last maintenance settlement, to be paid
    /// out as vesting cashback.
    pub pending_fees: Amount,

    /// Same as `pending_fees`, but paid out as immediately-withdrawable
    /// cashback.
    pub pending_vested_fees: Amount,
}

impl AccountStatistics {
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            most_recent_op: None,
            total_ops: 0,
            total_core_in_orders: 0,
            lifetime_fees_paid: 0,
            pending_fees: 0,
            pending_vested_fees: 0,
        }
    }

    /// Route a core fee into the pending accumulators.
    ///
    /// Once the account's cumulative paid fees exceed
    /// `cashback_vesting_threshold`, further fees are routed to the
    /// immediately-withdrawable pool; below it they must vest.
    pub fn pay_fee(&mut self, core_fee: Amount, cashback_vesting_threshold: Amount) {
        self.lifetime_fees_paid += core_fee;
        if self.lifetime_fees_paid > cashback_vesting_threshold {
            self.pending_vested_fees += core_fee;
        } else {
            self.pending_fees += core_fee;
        }
    }

    /// Push a new head onto the history chain.
    pub fn record_operation(&mut self, operation: OperationHistoryId) {
        self.most_recent_op = Some(operation);
        self.total_ops += 1;
    }

    /// Apply an order lifecycle delta to the locked-in-orders total.
    pub fn adjust_core_in_orders(&mut self, delta: Amount) -> Result<(), StateError> {
        if self.total_core_in_orders + delta < 0 {
            return Err(StateError::NegativeCoreInOrders {
                owner: self.owner,
                total: self.total_core_in_orders,
                delta,
            });
        }
        self.total_core_in_orders += delta;
        Ok(())
    }

    pub fn has_pending_fees(&self) -> bool {
        self.pending_fees > 0 || self.pending_vested_fees > 0
    }

    /// Settlement has paid everything out; start the next cycle at zero.
    pub(crate) fn reset_pending_fees(&mut self) {
        self.pending_fees = 0;
        self.pending_vested_fees = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pay_fee_routes_by_lifetime_threshold() {
        let mut stats = AccountStatistics::new(AccountId(1));

        // Below the threshold: fees vest.
        stats.pay_fee(600, 1_000);
        assert_eq!(stats.pending_fees, 600);
        assert_eq!(stats.pending_vested_fees, 0);
        assert_eq!(stats.lifetime_fees_paid, 600);

        // This fee pushes the lifetime total past the threshold.
        stats.pay_fee(500, 1_000);
        assert_eq!(stats.pending_fees, 600);
        assert_eq!(stats.pending_vested_fees, 500);
        assert_eq!(stats.lifetime_fees_paid, 1_100);

        // All further fees are pre-vested.
        stats.pay_fee(10, 1_000);
        assert_eq!(stats.pending_vested_fees, 510);
    }

    #[test]
    fn test_record_operation_moves_head() {
        let mut stats = AccountStatistics::new(AccountId(1));
        assert_eq!(stats.most_recent_op, None);

        stats.record_operation(OperationHistoryId(10));
        stats.record_operation(OperationHistoryId(11));
        assert_eq!(stats.most_recent_op, Some(OperationHistoryId(11)));
        assert_eq!(stats.total_ops, 2);
    }

    #[test]
    fn test_core_in_orders_never_negative() {
        let mut stats = AccountStatistics::new(AccountId(1));
        stats.adjust_core_in_orders(100).unwrap();
        stats.adjust_core_in_orders(-40).unwrap();
        assert_eq!(stats.total_core_in_orders, 60);

        let err = stats.adjust_core_in_orders(-61).unwrap_err();
        assert!(matches!(err, StateError::NegativeCoreInOrders { .. }));
        assert_eq!(stats.total_core_in_orders, 60);
    }
}
