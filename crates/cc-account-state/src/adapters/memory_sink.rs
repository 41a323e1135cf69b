//! In-memory implementation of the cashback port for testing.

use shared_types::{AccountId, Amount};
use std::collections::BTreeMap;

use crate::ports::cashback::{CashbackError, CashbackKind, CashbackSink};

/// Records every deposit instead of forwarding it to a vesting subsystem.
#[derive(Debug, Default)]
pub struct InMemoryCashbackSink {
    vesting: BTreeMap<AccountId, Amount>,
    immediate: BTreeMap<AccountId, Amount>,
    network: Amount,
}

impl InMemoryCashbackSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vesting_total(&self, account: AccountId) -> Amount {
        self.vesting.get(&account).copied().unwrap_or(0)
    }

    pub fn immediate_total(&self, account: AccountId) -> Amount {
        self.immediate.get(&account).copied().unwrap_or(0)
    }

    pub fn network_total(&self) -> Amount {
        self.network
    }

    /// Everything deposited anywhere, network share included.
    pub fn grand_total(&self) -> Amount {
        self.network
            + self.vesting.values().sum::<Amount>()
            + self.immediate.values().sum::<Amount>()
    }
}

impl CashbackSink for InMemoryCashbackSink {
    fn deposit_cashback(
        &mut self,
        account: AccountId,
        amount: Amount,
        kind: CashbackKind,
    ) -> Result<(), CashbackError> {
        let bucket = match kind {
            CashbackKind::Vesting => &mut self.vesting,
            CashbackKind::Immediate => &mut self.immediate,
        };
        *bucket.entry(account).or_insert(0) += amount;
        Ok(())
    }

    fn deposit_network_fee(&mut self, amount: Amount) -> Result<(), CashbackError> {
        self.network += amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_accumulates_by_kind() {
        let mut sink = InMemoryCashbackSink::new();
        sink.deposit_cashback(AccountId(1), 100, CashbackKind::Vesting)
            .unwrap();
        sink.deposit_cashback(AccountId(1), 50, CashbackKind::Immediate)
            .unwrap();
        sink.deposit_cashback(AccountId(1), 25, CashbackKind::Vesting)
            .unwrap();
        sink.deposit_network_fee(10).unwrap();

        assert_eq!(sink.vesting_total(AccountId(1)), 125);
        assert_eq!(sink.immediate_total(AccountId(1)), 50);
        assert_eq!(sink.network_total(), 10);
        assert_eq!(sink.grand_total(), 185);
    }
}
