//! Read-side access layer over the account store.
//!
//! Combined views assembled for API consumers. Queries never mutate and
//! never fail: a missing or mismatched account yields `None`, missing
//! balances read as zero.

use serde::{Deserialize, Serialize};
use shared_types::{AccountId, Amount, AssetId, LicenseInformationId};

use super::service::AccountStateService;

/// Everything a front end needs to render one vault account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultInfo {
    /// Available cash-asset balance.
    pub cash_balance: Amount,
    /// Reserved cash-asset funds.
    pub cash_reserved: Amount,
    /// Available core-asset balance.
    pub core_balance: Amount,
    /// Free cycles granted by the vault's licenses.
    pub free_cycle_balance: Amount,
    /// Core-asset spending ceiling for the current interval.
    pub limit: Amount,
    /// The same ceiling in reference currency.
    pub eur_limit: Amount,
    /// Spent inside the current interval.
    pub spent: Amount,
    pub is_tethered: bool,
    pub owner_change_counter: u32,
    pub active_change_counter: u32,
    pub license_information: Option<LicenseInformationId>,
}

impl AccountStateService {
    /// Combined view of a vault account, or `None` when the id is unknown
    /// or does not name a vault.
    pub fn vault_info(
        &self,
        vault_id: AccountId,
        cash_asset: AssetId,
        core_asset: AssetId,
    ) -> Option<VaultInfo> {
        let account = self.account(vault_id)?;
        if !account.is_vault() {
            return None;
        }

        let cash = self.get_balance(vault_id, cash_asset);
        let cash_reserved = self.get_reserved_balance(vault_id, cash_asset);
        let core = self.get_balance(vault_id, core_asset);
        let limit = self.get_limit(vault_id, core_asset);
        let spent = self.get_spent_balance(vault_id, core_asset);
        let eur_limit = self
            .balance_object(vault_id, core_asset)
            .map(|balance| balance.eur_limit)
            .unwrap_or(0);

        Some(VaultInfo {
            cash_balance: cash.amount,
            cash_reserved: cash_reserved.amount,
            core_balance: core.amount,
            free_cycle_balance: self.get_cycle_balance(vault_id),
            limit: limit.amount,
            eur_limit,
            spent: spent.amount,
            is_tethered: account.is_tethered(),
            owner_change_counter: account.owner_change_counter,
            active_change_counter: account.active_change_counter,
            license_information: account.license_information,
        })
    }

    /// Batch form of [`vault_info`](Self::vault_info); unknown ids map to
    /// `None` rather than truncating the result.
    pub fn vaults_info(
        &self,
        vault_ids: impl IntoIterator<Item = AccountId>,
        cash_asset: AssetId,
        core_asset: AssetId,
    ) -> Vec<(AccountId, Option<VaultInfo>)> {
        vault_ids
            .into_iter()
            .map(|id| (id, self.vault_info(id, cash_asset, core_asset)))
            .collect()
    }
}
