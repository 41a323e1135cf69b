//! Outbound port to the vesting/cashback subsystem.
//!
//! Fee settlement only issues deposit instructions; vesting schedules and
//! balance objects live on the other side of this boundary.

use shared_types::{AccountId, Amount};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CashbackError {
    #[error("Vesting subsystem rejected deposit of {amount} to {account}: {reason}")]
    DepositRejected {
        account: AccountId,
        amount: Amount,
        reason: String,
    },
}

/// How a settled share is released to its recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashbackKind {
    /// Released over the normal vesting schedule.
    Vesting,
    /// Immediately available for withdrawal.
    Immediate,
}

/// Receives the per-recipient deposits produced by fee settlement.
pub trait CashbackSink {
    /// Credit `amount` to the recipient's cashback vesting balance.
    fn deposit_cashback(
        &mut self,
        account: AccountId,
        amount: Amount,
        kind: CashbackKind,
    ) -> Result<(), CashbackError>;

    /// Remove the network's share from circulation.
    fn deposit_network_fee(&mut self, amount: Amount) -> Result<(), CashbackError>;
}
