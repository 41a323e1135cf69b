//! # Payment Operations
//!
//! Value objects for the payment-network operations that reference account
//! state. Each operation validates its own fields; evaluation against the
//! store (authority checks, duplicate registrations) belongs to the
//! operation-validation layer.

use serde::{Deserialize, Serialize};
use shared_types::{AccountId, Amount, PublicKey};

use super::errors::StateError;

/// Root-authority operation configuring the global debit/credit transaction
/// ratios of the payment network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTransactionRatio {
    pub authority: AccountId,
    pub debit_ratio: Amount,
    pub credit_ratio: Amount,
}

impl SetTransactionRatio {
    pub fn fee_payer(&self) -> AccountId {
        self.authority
    }

    pub fn validate(&self) -> Result<(), StateError> {
        for ratio in [self.debit_ratio, self.credit_ratio] {
            if ratio < 0 {
                return Err(StateError::NegativeRatio { ratio });
            }
        }
        Ok(())
    }
}

/// A wallet account registering a payment key with a payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterPaymentAuthority {
    pub issuer: AccountId,
    pub payment_provider: AccountId,
    pub payment_public_key: PublicKey,
    pub memo: Option<String>,
}

impl RegisterPaymentAuthority {
    pub fn fee_payer(&self) -> AccountId {
        self.issuer
    }

    pub fn validate(&self) -> Result<(), StateError> {
        if self.issuer == self.payment_provider {
            return Err(StateError::ProviderIsIssuer {
                account: self.issuer,
            });
        }
        if let Some(memo) = &self.memo {
            if memo.is_empty() {
                return Err(StateError::EmptyMemo);
            }
        }
        Ok(())
    }
}

/// Withdraws a previously registered payment authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnregisterPaymentAuthority {
    pub issuer: AccountId,
    pub payment_provider: AccountId,
}

impl UnregisterPaymentAuthority {
    pub fn fee_payer(&self) -> AccountId {
        self.issuer
    }

    pub fn validate(&self) -> Result<(), StateError> {
        Ok(())
    }
}

/// A debit initiated by a payment provider against a user account, signed
/// with the registered payment key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDebit {
    pub issuer: AccountId,
    pub amount: Amount,
    pub auth_key: PublicKey,
}

impl PaymentDebit {
    pub fn fee_payer(&self) -> AccountId {
        self.issuer
    }

    pub fn validate(&self) -> Result<(), StateError> {
        if self.amount <= 0 {
            return Err(StateError::NonPositiveAmount {
                amount: self.amount,
            });
        }
        Ok(())
    }
}

/// Root-authority operation admitting a payment service provider and its
/// clearing accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePaymentServiceProvider {
    pub authority: AccountId,
    pub provider_account: AccountId,
    pub clearing_accounts: Vec<AccountId>,
}

impl CreatePaymentServiceProvider {
    pub fn fee_payer(&self) -> AccountId {
        self.authority
    }

    pub fn validate(&self) -> Result<(), StateError> {
        let mut seen = std::collections::BTreeSet::new();
        for clearing in &self.clearing_accounts {
            if !seen.insert(*clearing) {
                return Err(StateError::DuplicateClearingAccount { account: *clearing });
            }
        }
        Ok(())
    }
}
