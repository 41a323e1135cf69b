use shared_types::{AccountId, Amount, AssetId};
use thiserror::Error;

use crate::ports::cashback::CashbackError;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Account not found: {account}")]
    AccountNotFound { account: AccountId },

    #[error("Account name already registered: {name}")]
    AccountNameExists { name: String },

    #[error("Account name may not be empty")]
    EmptyAccountName,

    #[error("Account kind is fixed at registration: {account}")]
    KindImmutable { account: AccountId },

    #[error("Asset type mismatch: balance holds {expected}, delta is {actual}")]
    AssetTypeMismatch { expected: AssetId, actual: AssetId },

    #[error("Balance of {owner} in {asset} would become negative: {balance} + {delta}")]
    NegativeBalance {
        owner: AccountId,
        asset: AssetId,
        balance: Amount,
        delta: Amount,
    },

    #[error("Reserved balance of {owner} in {asset} would become negative: {reserved} + {delta}")]
    NegativeReserved {
        owner: AccountId,
        asset: AssetId,
        reserved: Amount,
        delta: Amount,
    },

    #[error("Cycle balance of {owner} would become negative: {balance} + {delta}")]
    NegativeCycleBalance {
        owner: AccountId,
        balance: Amount,
        delta: Amount,
    },

    #[error("Core-in-orders total of {owner} would become negative: {total} + {delta}")]
    NegativeCoreInOrders {
        owner: AccountId,
        total: Amount,
        delta: Amount,
    },

    #[error("Amount must be positive, got {amount}")]
    NonPositiveAmount { amount: Amount },

    #[error("Hierarchy depth of {account} would exceed the maximum of {max}")]
    HierarchyDepthExceeded { account: AccountId, max: u8 },

    #[error("Account {account} is not a wallet")]
    NotAWallet { account: AccountId },

    #[error("Account {account} is not a vault")]
    NotAVault { account: AccountId },

    #[error("Vault {vault} is already tethered to wallet {wallet}")]
    AlreadyTethered { wallet: AccountId, vault: AccountId },

    #[error("Vault {vault} is not tethered to wallet {wallet}")]
    NotTethered { wallet: AccountId, vault: AccountId },

    #[error("Account {account} is tethered; untether it first")]
    AccountTethered { account: AccountId },

    #[error("Account {account} may not list itself")]
    SelfListing { account: AccountId },

    #[error("Account {owner} may not hold asset {asset}")]
    AssetNotAllowed { owner: AccountId, asset: AssetId },

    #[error("Account {account} has no cashback vesting balance configured")]
    NoCashbackBalance { account: AccountId },

    #[error("Account {account} has opted out of key rollback")]
    RollBackDisabled { account: AccountId },

    #[error("Key rollback pending on {account}: only key replacement may be applied")]
    RollBackPending { account: AccountId },

    #[error("Percentage out of range: {value} basis points")]
    InvalidPercentage { value: u16 },

    #[error("Payment provider must differ from issuer: {account}")]
    ProviderIsIssuer { account: AccountId },

    #[error("Clearing account listed twice: {account}")]
    DuplicateClearingAccount { account: AccountId },

    #[error("Ratio must be non-negative, got {ratio}")]
    NegativeRatio { ratio: Amount },

    #[error("Memo may not be empty when present")]
    EmptyMemo,

    #[error("Cashback deposit failed: {0}")]
    Cashback(#[from] CashbackError),
}
