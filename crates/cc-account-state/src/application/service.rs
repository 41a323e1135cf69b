//! # Account State Service
//!
//! The single-writer mutation path over all account state. Every mutation
//! follows the same shape:
//!
//! 1. Validate against the current state; reject before anything changes.
//! 2. Apply the change to the primary entity.
//! 3. Drive the reverse-lookup index observers with the before/after pair.
//!
//! A rejected mutation therefore leaves both entities and indices exactly as
//! they were; a committed one leaves them exactly consistent. The service
//! holds no locks: the surrounding validation context serializes writers.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use shared_types::{
    AccountId, Amount, Asset, AssetId, Authority, LicenseInformationId, LicenseTypeId,
    OperationHistoryId, SpecialAuthority, TimePointSec, VestingBalanceId, FULL_PERCENT,
};

use crate::config::ChainParameters;
use crate::domain::balance::{AccountBalance, CycleBalance};
use crate::domain::entities::{Account, AccountKind, AccountListing};
use crate::domain::errors::StateError;
use crate::domain::fees::split_fee;
use crate::domain::indexes::{AccountMemberIndex, AccountReferrerIndex, StoreObserver};
use crate::domain::invariants;
use crate::domain::statistics::AccountStatistics;
use crate::ports::cashback::{CashbackKind, CashbackSink};

/// Everything needed to register a new account.
///
/// Fee percentages left unset default from [`ChainParameters`]; the
/// membership expiration defaults to the epoch, i.e. a basic account.
#[derive(Debug, Clone)]
pub struct AccountRegistration {
    pub name: String,
    pub kind: AccountKind,
    pub registrar: AccountId,
    pub referrer: AccountId,
    pub lifetime_referrer: AccountId,
    pub owner: Authority,
    pub active: Authority,
    pub membership_expiration_date: TimePointSec,
    pub network_fee_percentage: Option<u16>,
    pub lifetime_referrer_fee_percentage: Option<u16>,
    pub referrer_rewards_percentage: Option<u16>,
    pub roll_back_enabled: bool,
    pub pi_level: u8,
    pub license_information: Option<LicenseInformationId>,
    pub allowed_assets: Option<BTreeSet<AssetId>>,
}

impl AccountRegistration {
    pub fn new(
        name: impl Into<String>,
        kind: AccountKind,
        registrar: AccountId,
        referrer: AccountId,
        lifetime_referrer: AccountId,
        owner: Authority,
        active: Authority,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            registrar,
            referrer,
            lifetime_referrer,
            owner,
            active,
            membership_expiration_date: TimePointSec::from_unix(0),
            network_fee_percentage: None,
            lifetime_referrer_fee_percentage: None,
            referrer_rewards_percentage: None,
            roll_back_enabled: true,
            pi_level: 0,
            license_information: None,
            allowed_assets: None,
        }
    }
}

/// In-memory account state store with incrementally maintained indices.
pub struct AccountStateService {
    params: ChainParameters,

    accounts: BTreeMap<AccountId, Account>,
    account_names: BTreeMap<String, AccountId>,
    statistics: BTreeMap<AccountId, AccountStatistics>,

    balances: BTreeMap<(AccountId, AssetId), AccountBalance>,
    /// Per-asset holder enumeration: asset ascending, balance descending,
    /// owner ascending. Kept consistent by the balance mutation helper.
    by_asset_balance: BTreeSet<(AssetId, Reverse<Amount>, AccountId)>,
    cycle_balances: BTreeMap<AccountId, CycleBalance>,

    member_index: AccountMemberIndex,
    referrer_index: AccountReferrerIndex,

    next_account_id: u64,
}

impl Default for AccountStateService {
    fn default() -> Self {
        Self::new(ChainParameters::default())
    }
}

impl AccountStateService {
    pub fn new(params: ChainParameters) -> Self {
        Self {
            params,
            accounts: BTreeMap::new(),
            account_names: BTreeMap::new(),
            statistics: BTreeMap::new(),
            balances: BTreeMap::new(),
            by_asset_balance: BTreeSet::new(),
            cycle_balances: BTreeMap::new(),
            member_index: AccountMemberIndex::new(),
            referrer_index: AccountReferrerIndex::new(),
            next_account_id: 0,
        }
    }

    pub fn params(&self) -> &ChainParameters {
        &self.params
    }

    // =========================================================================
    // ACCOUNT LIFECYCLE
    // =========================================================================

    /// Register a new account and its statistics record.
    pub fn register_account(
        &mut self,
        registration: AccountRegistration,
    ) -> Result<AccountId, StateError> {
        if registration.name.is_empty() {
            return Err(StateError::EmptyAccountName);
        }
        if self.account_names.contains_key(&registration.name) {
            return Err(StateError::AccountNameExists {
                name: registration.name,
            });
        }

        let id = AccountId(self.next_account_id);
        let account = Account {
            id,
            kind: registration.kind,
            hierarchy_depth: 0,
            parents: BTreeSet::new(),
            vault: BTreeSet::new(),
            disable_vault_to_wallet_limit: false,
            membership_expiration_date: registration.membership_expiration_date,
            registrar: registration.registrar,
            referrer: registration.referrer,
            lifetime_referrer: registration.lifetime_referrer,
            network_fee_percentage: registration
                .network_fee_percentage
                .unwrap_or(self.params.default_network_fee_percentage),
            lifetime_referrer_fee_percentage: registration
                .lifetime_referrer_fee_percentage
                .unwrap_or(self.params.default_lifetime_referrer_fee_percentage),
            referrer_rewards_percentage: registration
                .referrer_rewards_percentage
                .unwrap_or(self.params.default_referrer_rewards_percentage),
            name: registration.name,
            owner: registration.owner,
            owner_roll_back: Authority::default(),
            owner_change_counter: 0,
            active: registration.active,
            active_roll_back: Authority::default(),
            active_change_counter: 0,
            roll_back_enabled: registration.roll_back_enabled,
            roll_back_active: false,
            whitelisting_accounts: BTreeSet::new(),
            blacklisting_accounts: BTreeSet::new(),
            whitelisted_accounts: BTreeSet::new(),
            blacklisted_accounts: BTreeSet::new(),
            cashback_vb: None,
            owner_special_authority: SpecialAuthority::None,
            active_special_authority: SpecialAuthority::None,
            license_information: registration.license_information,
            pi_level: registration.pi_level,
            top_n_control_flags: 0,
            allowed_assets: registration.allowed_assets,
        };
        self.validate_account(&account)?;

        self.member_index.inserted(&account);
        self.referrer_index.inserted(&account);
        self.account_names.insert(account.name.clone(), id);
        self.statistics.insert(id, AccountStatistics::new(id));
        self.accounts.insert(id, account);
        self.next_account_id += 1;

        info!(account = %id, "registered account");
        Ok(id)
    }

    /// Apply an arbitrary mutation to an account.
    ///
    /// The mutation runs on a copy; it is committed, and the index observers
    /// driven, only if the result still satisfies every invariant. Rejected
    /// while a key rollback is pending.
    pub fn update_account(
        &mut self,
        account_id: AccountId,
        mutate: impl FnOnce(&mut Account),
    ) -> Result<(), StateError> {
        self.guard_roll_back(account_id)?;
        self.apply_update(account_id, mutate)
    }

    /// Remove an account from the store and every index.
    ///
    /// Accounts are normally never deleted; this exists for the benefit of
    /// store rollback, which replays removals of registrations being undone.
    pub fn remove_account(&mut self, account_id: AccountId) -> Result<Account, StateError> {
        match self.accounts.get(&account_id) {
            None => {
                return Err(StateError::AccountNotFound {
                    account: account_id,
                })
            }
            Some(account) if account.is_tethered() => {
                return Err(StateError::AccountTethered {
                    account: account_id,
                })
            }
            Some(_) => {}
        }

        let Some(account) = self.accounts.remove(&account_id) else {
            return Err(StateError::AccountNotFound {
                account: account_id,
            });
        };
        self.member_index.removed(&account);
        self.referrer_index.removed(&account);
        self.account_names.remove(&account.name);
        self.statistics.remove(&account_id);
        self.cycle_balances.remove(&account_id);

        let balance_keys: Vec<(AccountId, AssetId)> = self
            .balances
            .range((account_id, AssetId(u64::MIN))..=(account_id, AssetId(u64::MAX)))
            .map(|(key, _)| *key)
            .collect();
        for key in balance_keys {
            if let Some(balance) = self.balances.remove(&key) {
                self.by_asset_balance.remove(&balance.enumeration_key());
            }
        }

        info!(account = %account_id, "removed account");
        Ok(account)
    }

    fn apply_update(
        &mut self,
        account_id: AccountId,
        mutate: impl FnOnce(&mut Account),
    ) -> Result<(), StateError> {
        let old = self
            .accounts
            .get(&account_id)
            .cloned()
            .ok_or(StateError::AccountNotFound {
                account: account_id,
            })?;

        let mut updated = old.clone();
        mutate(&mut updated);
        updated.id = old.id;

        if updated.kind != old.kind {
            return Err(StateError::KindImmutable {
                account: account_id,
            });
        }
        self.validate_account(&updated)?;
        if updated.name != old.name && self.account_names.contains_key(&updated.name) {
            return Err(StateError::AccountNameExists { name: updated.name });
        }

        self.commit_update(&old, updated);
        Ok(())
    }

    /// Entity swap plus observer dispatch. Infallible: all validation has
    /// already happened.
    fn commit_update(&mut self, old: &Account, updated: Account) {
        if updated.name != old.name {
            self.account_names.remove(&old.name);
            self.account_names.insert(updated.name.clone(), updated.id);
        }
        self.member_index.before_update(old);
        self.referrer_index.before_update(old);
        self.member_index.after_update(&updated);
        self.referrer_index.after_update(&updated);
        self.accounts.insert(updated.id, updated);
    }

    fn validate_account(&self, account: &Account) -> Result<(), StateError> {
        if account.name.is_empty() {
            return Err(StateError::EmptyAccountName);
        }
        if !invariants::hierarchy_depth_valid(account, self.params.maximum_hierarchy_depth) {
            return Err(StateError::HierarchyDepthExceeded {
                account: account.id,
                max: self.params.maximum_hierarchy_depth,
            });
        }
        if !account.vault.is_empty() && !account.is_wallet() {
            return Err(StateError::NotAWallet {
                account: account.id,
            });
        }
        if !account.parents.is_empty() && !account.is_vault() {
            return Err(StateError::NotAVault {
                account: account.id,
            });
        }
        for percentage in [
            account.network_fee_percentage,
            account.lifetime_referrer_fee_percentage,
            account.referrer_rewards_percentage,
        ] {
            if percentage > FULL_PERCENT {
                return Err(StateError::InvalidPercentage { value: percentage });
            }
        }
        Ok(())
    }

    fn guard_roll_back(&self, account_id: AccountId) -> Result<(), StateError> {
        match self.accounts.get(&account_id) {
            None => Err(StateError::AccountNotFound {
                account: account_id,
            }),
            Some(account) if account.roll_back_active => Err(StateError::RollBackPending {
                account: account_id,
            }),
            Some(_) => Ok(()),
        }
    }

    // =========================================================================
    // TETHERING
    // =========================================================================

    /// Tether `vault_id` under `wallet_id`, keeping the relationship mutual
    /// and the hierarchy one level deep.
    pub fn tether_vault(
        &mut self,
        wallet_id: AccountId,
        vault_id: AccountId,
    ) -> Result<(), StateError> {
        self.guard_roll_back(wallet_id)?;
        self.guard_roll_back(vault_id)?;

        let wallet = self
            .accounts
            .get(&wallet_id)
            .cloned()
            .ok_or(StateError::AccountNotFound { account: wallet_id })?;
        let vault = self
            .accounts
            .get(&vault_id)
            .cloned()
            .ok_or(StateError::AccountNotFound { account: vault_id })?;

        if !wallet.is_wallet() {
            return Err(StateError::NotAWallet { account: wallet_id });
        }
        if !vault.is_vault() {
            return Err(StateError::NotAVault { account: vault_id });
        }
        if wallet.has_in_vault(vault_id) || vault.has_in_parents(wallet_id) {
            return Err(StateError::AlreadyTethered {
                wallet: wallet_id,
                vault: vault_id,
            });
        }

        let mut new_wallet = wallet.clone();
        new_wallet.vault.insert(vault_id);
        let mut new_vault = vault.clone();
        new_vault.parents.insert(wallet_id);
        new_vault.hierarchy_depth = 1;

        self.validate_account(&new_wallet)?;
        self.validate_account(&new_vault)?;

        self.commit_update(&wallet, new_wallet);
        self.commit_update(&vault, new_vault);
        debug_assert!(invariants::tethering_symmetric(
            &self.accounts[&wallet_id],
            &self.accounts[&vault_id],
        ));

        info!(wallet = %wallet_id, vault = %vault_id, "tethered vault to wallet");
        Ok(())
    }

    /// Undo a tether; the vault drops back to depth 0 once its last parent
    /// is gone.
    pub fn untether_vault(
        &mut self,
        wallet_id: AccountId,
        vault_id: AccountId,
    ) -> Result<(), StateError> {
        self.guard_roll_back(wallet_id)?;
        self.guard_roll_back(vault_id)?;

        let wallet = self
            .accounts
            .get(&wallet_id)
            .cloned()
            .ok_or(StateError::AccountNotFound { account: wallet_id })?;
        let vault = self
            .accounts
            .get(&vault_id)
            .cloned()
            .ok_or(StateError::AccountNotFound { account: vault_id })?;

        if !wallet.has_in_vault(vault_id) || !vault.has_in_parents(wallet_id) {
            return Err(StateError::NotTethered {
                wallet: wallet_id,
                vault: vault_id,
            });
        }

        let mut new_wallet = wallet.clone();
        new_wallet.vault.remove(&vault_id);
        let mut new_vault = vault.clone();
        new_vault.parents.remove(&wallet_id);
        if new_vault.parents.is_empty() {
            new_vault.hierarchy_depth = 0;
        }

        self.commit_update(&wallet, new_wallet);
        self.commit_update(&vault, new_vault);

        info!(wallet = %wallet_id, vault = %vault_id, "untethered vault from wallet");
        Ok(())
    }

    // =========================================================================
    // LISTINGS
    // =========================================================================

    /// Record `lister`'s listing of `listee`, updating the lister's display
    /// sets and the listee's incoming-listing sets together.
    pub fn set_account_listing(
        &mut self,
        lister_id: AccountId,
        listee_id: AccountId,
        listing: AccountListing,
    ) -> Result<(), StateError> {
        if lister_id == listee_id {
            return Err(StateError::SelfListing {
                account: lister_id,
            });
        }
        self.guard_roll_back(lister_id)?;
        if !self.accounts.contains_key(&listee_id) {
            return Err(StateError::AccountNotFound {
                account: listee_id,
            });
        }

        self.apply_update(lister_id, |lister| {
            lister.whitelisted_accounts.remove(&listee_id);
            lister.blacklisted_accounts.remove(&listee_id);
            match listing {
                AccountListing::NoListing => {}
                AccountListing::WhiteListed => {
                    lister.whitelisted_accounts.insert(listee_id);
                }
                AccountListing::BlackListed => {
                    lister.blacklisted_accounts.insert(listee_id);
                }
            }
        })?;
        self.apply_update(listee_id, |listee| {
            listee.whitelisting_accounts.remove(&lister_id);
            listee.blacklisting_accounts.remove(&lister_id);
            match listing {
                AccountListing::NoListing => {}
                AccountListing::WhiteListed => {
                    listee.whitelisting_accounts.insert(lister_id);
                }
                AccountListing::BlackListed => {
                    listee.blacklisting_accounts.insert(lister_id);
                }
            }
        })?;
        Ok(())
    }

    // =========================================================================
    // AUTHORITIES
    // =========================================================================

    pub fn update_owner_authority(
        &mut self,
        account_id: AccountId,
        new_owner: Authority,
    ) -> Result<(), StateError> {
        self.update_account(account_id, |account| {
            account.replace_owner_authority(new_owner);
        })
    }

    pub fn update_active_authority(
        &mut self,
        account_id: AccountId,
        new_active: Authority,
    ) -> Result<(), StateError> {
        self.update_account(account_id, |account| {
            account.replace_active_authority(new_active);
        })
    }

    pub fn set_special_authorities(
        &mut self,
        account_id: AccountId,
        owner: SpecialAuthority,
        active: SpecialAuthority,
    ) -> Result<(), StateError> {
        self.update_account(account_id, |account| {
            account.set_special_authorities(owner, active);
        })
    }

    /// Install authorities derived by the top-holders logic, marking them as
    /// derived rather than explicitly set.
    pub fn apply_derived_authorities(
        &mut self,
        account_id: AccountId,
        owner: Option<Authority>,
        active: Option<Authority>,
    ) -> Result<(), StateError> {
        self.update_account(account_id, |account| {
            account.apply_derived_authorities(owner, active);
        })
    }

    /// Swap the rollback backups in as the current keys. One-shot: until the
    /// follow-up key replacement lands, every other mutation of the account
    /// is rejected.
    pub fn roll_back_public_keys(&mut self, account_id: AccountId) -> Result<(), StateError> {
        let account = self
            .accounts
            .get(&account_id)
            .ok_or(StateError::AccountNotFound {
                account: account_id,
            })?;
        if !account.roll_back_enabled {
            return Err(StateError::RollBackDisabled {
                account: account_id,
            });
        }
        if account.roll_back_active {
            return Err(StateError::RollBackPending {
                account: account_id,
            });
        }

        self.apply_update(account_id, |account| account.roll_back_keys())?;
        info!(account = %account_id, "rolled back public keys");
        Ok(())
    }

    /// Replace both authorities. The only mutation accepted while a rollback
    /// is pending; completing it clears the pending flag.
    pub fn replace_public_keys(
        &mut self,
        account_id: AccountId,
        new_owner: Authority,
        new_active: Authority,
    ) -> Result<(), StateError> {
        self.apply_update(account_id, |account| {
            account.replace_owner_authority(new_owner);
            account.replace_active_authority(new_active);
            account.roll_back_active = false;
        })
    }

    // =========================================================================
    // BALANCES
    // =========================================================================

    /// Apply a signed delta to the owner's balance in the delta's asset,
    /// creating the balance record on first use.
    pub fn adjust_balance(&mut self, owner: AccountId, delta: Asset) -> Result<(), StateError> {
        let account = self
            .accounts
            .get(&owner)
            .ok_or(StateError::AccountNotFound { account: owner })?;
        if let Some(allowed) = &account.allowed_assets {
            if !allowed.contains(&delta.asset_id) {
                return Err(StateError::AssetNotAllowed {
                    owner,
                    asset: delta.asset_id,
                });
            }
        }

        self.with_balance(owner, delta.asset_id, |balance| {
            balance.adjust_balance(delta)
        })?;
        debug!(owner = %owner, delta = %delta, "adjusted balance");
        Ok(())
    }

    /// Apply a signed delta to the reserved portion of a balance.
    pub fn adjust_reserved_balance(
        &mut self,
        owner: AccountId,
        delta: Asset,
    ) -> Result<(), StateError> {
        if !self.accounts.contains_key(&owner) {
            return Err(StateError::AccountNotFound { account: owner });
        }
        self.with_balance(owner, delta.asset_id, |balance| {
            balance.adjust_reserved(delta)
        })
    }

    /// Accumulate spending against the current limit interval.
    pub fn record_spent(
        &mut self,
        owner: AccountId,
        asset: AssetId,
        amount: Amount,
    ) -> Result<(), StateError> {
        if !self.accounts.contains_key(&owner) {
            return Err(StateError::AccountNotFound { account: owner });
        }
        self.with_balance(owner, asset, |balance| balance.record_spent(amount))
    }

    /// Interval boundary, invoked by the maintenance driver.
    pub fn reset_spent_interval(
        &mut self,
        owner: AccountId,
        asset: AssetId,
    ) -> Result<(), StateError> {
        if !self.accounts.contains_key(&owner) {
            return Err(StateError::AccountNotFound { account: owner });
        }
        self.with_balance(owner, asset, |balance| {
            balance.reset_spent();
            Ok(())
        })
    }

    pub fn set_spending_limits(
        &mut self,
        owner: AccountId,
        asset: AssetId,
        limit: Amount,
        eur_limit: Amount,
    ) -> Result<(), StateError> {
        if !self.accounts.contains_key(&owner) {
            return Err(StateError::AccountNotFound { account: owner });
        }
        self.with_balance(owner, asset, |balance| {
            balance.set_limits(limit, eur_limit);
            Ok(())
        })
    }

    /// Run a mutation against a copy of the balance record; commit it and
    /// refresh the enumeration index only on success.
    fn with_balance<R>(
        &mut self,
        owner: AccountId,
        asset: AssetId,
        mutate: impl FnOnce(&mut AccountBalance) -> Result<R, StateError>,
    ) -> Result<R, StateError> {
        let key = (owner, asset);
        let mut balance = self
            .balances
            .get(&key)
            .cloned()
            .unwrap_or_else(|| AccountBalance::new(owner, asset));
        let old_enumeration_key = balance.enumeration_key();

        let result = mutate(&mut balance)?;

        self.by_asset_balance.remove(&old_enumeration_key);
        self.by_asset_balance.insert(balance.enumeration_key());
        self.balances.insert(key, balance);
        Ok(result)
    }

    pub fn get_balance(&self, owner: AccountId, asset: AssetId) -> Asset {
        self.balances
            .get(&(owner, asset))
            .map(AccountBalance::get_balance)
            .unwrap_or(Asset::new(0, asset))
    }

    pub fn get_reserved_balance(&self, owner: AccountId, asset: AssetId) -> Asset {
        self.balances
            .get(&(owner, asset))
            .map(AccountBalance::get_reserved_balance)
            .unwrap_or(Asset::new(0, asset))
    }

    pub fn get_spent_balance(&self, owner: AccountId, asset: AssetId) -> Asset {
        self.balances
            .get(&(owner, asset))
            .map(AccountBalance::get_spent_balance)
            .unwrap_or(Asset::new(0, asset))
    }

    pub fn get_limit(&self, owner: AccountId, asset: AssetId) -> Asset {
        self.balances
            .get(&(owner, asset))
            .map(AccountBalance::get_limit)
            .unwrap_or(Asset::new(0, asset))
    }

    pub fn balance_object(&self, owner: AccountId, asset: AssetId) -> Option<&AccountBalance> {
        self.balances.get(&(owner, asset))
    }

    /// All holders of `asset`, largest balance first, owner id breaking
    /// ties. The enumeration order consumed by forced-settlement passes.
    pub fn holders_by_balance(
        &self,
        asset: AssetId,
    ) -> impl Iterator<Item = (AccountId, Amount)> + '_ {
        let start = (asset, Reverse(Amount::MAX), AccountId(u64::MIN));
        let end = (asset, Reverse(Amount::MIN), AccountId(u64::MAX));
        self.by_asset_balance
            .range(start..=end)
            .map(|&(_, Reverse(amount), owner)| (owner, amount))
    }

    // =========================================================================
    // CYCLE BALANCES
    // =========================================================================

    pub fn get_cycle_balance(&self, owner: AccountId) -> Amount {
        self.cycle_balances
            .get(&owner)
            .map(CycleBalance::get_balance)
            .unwrap_or(0)
    }

    pub fn adjust_cycle_balance(
        &mut self,
        owner: AccountId,
        delta: Amount,
    ) -> Result<(), StateError> {
        if !self.accounts.contains_key(&owner) {
            return Err(StateError::AccountNotFound { account: owner });
        }
        self.cycle_balances
            .entry(owner)
            .or_insert_with(|| CycleBalance::new(owner))
            .adjust(delta)
    }

    // =========================================================================
    // STATISTICS & FEES
    // =========================================================================

    pub fn statistics(&self, owner: AccountId) -> Option<&AccountStatistics> {
        self.statistics.get(&owner)
    }

    /// Route a paid core fee into the owner's pending accumulators.
    pub fn pay_fee(&mut self, owner: AccountId, core_fee: Amount) -> Result<(), StateError> {
        if core_fee < 0 {
            return Err(StateError::NonPositiveAmount { amount: core_fee });
        }
        let threshold = self.params.cashback_vesting_threshold;
        let stats = self
            .statistics
            .get_mut(&owner)
            .ok_or(StateError::AccountNotFound { account: owner })?;
        stats.pay_fee(core_fee, threshold);
        Ok(())
    }

    /// Push a new head onto the owner's transaction-history chain.
    pub fn record_operation(
        &mut self,
        owner: AccountId,
        operation: OperationHistoryId,
    ) -> Result<(), StateError> {
        self.statistics
            .get_mut(&owner)
            .ok_or(StateError::AccountNotFound { account: owner })?
            .record_operation(operation);
        Ok(())
    }

    /// Order lifecycle delta against the owner's locked-in-orders total.
    pub fn adjust_core_in_orders(
        &mut self,
        owner: AccountId,
        delta: Amount,
    ) -> Result<(), StateError> {
        self.statistics
            .get_mut(&owner)
            .ok_or(StateError::AccountNotFound { account: owner })?
            .adjust_core_in_orders(delta)
    }

    /// Link the vesting balance created by the vesting subsystem as this
    /// account's cashback target.
    pub fn set_cashback_balance(
        &mut self,
        account_id: AccountId,
        vesting_balance: VestingBalanceId,
    ) -> Result<(), StateError> {
        self.update_account(account_id, |account| {
            account.cashback_vb = Some(vesting_balance);
        })
    }

    /// Split and pay out both pending-fee pools of one account.
    ///
    /// Each pool is divided network / lifetime-referrer / referrer /
    /// registrar with all rounding dust accruing to the registrar, so the
    /// deposits reconstruct the pool exactly. The vesting pool is deposited
    /// as vesting cashback, the pre-vested pool as immediately available.
    /// A no-op when nothing is pending.
    pub fn process_fees(
        &mut self,
        account_id: AccountId,
        sink: &mut dyn CashbackSink,
    ) -> Result<(), StateError> {
        let stats = self
            .statistics
            .get(&account_id)
            .ok_or(StateError::AccountNotFound {
                account: account_id,
            })?;
        if !stats.has_pending_fees() {
            return Ok(());
        }
        let vesting_pool = stats.pending_fees;
        let vested_pool = stats.pending_vested_fees;

        let account = self
            .accounts
            .get(&account_id)
            .ok_or(StateError::AccountNotFound {
                account: account_id,
            })?;
        let registrar = account.registrar;
        let referrer = account.referrer;
        let lifetime_referrer = account.lifetime_referrer;
        let network_pct = account.network_fee_percentage;
        let lifetime_pct = account.lifetime_referrer_fee_percentage;
        let referrer_pct = account.referrer_rewards_percentage;

        for (pool, kind) in [
            (vesting_pool, CashbackKind::Vesting),
            (vested_pool, CashbackKind::Immediate),
        ] {
            if pool == 0 {
                continue;
            }
            let shares = split_fee(pool, network_pct, lifetime_pct, referrer_pct);
            debug_assert_eq!(shares.total(), pool);

            if shares.network > 0 {
                sink.deposit_network_fee(shares.network)?;
            }
            if shares.lifetime_referrer > 0 {
                sink.deposit_cashback(lifetime_referrer, shares.lifetime_referrer, kind)?;
            }
            if shares.referrer > 0 {
                sink.deposit_cashback(referrer, shares.referrer, kind)?;
            }
            if shares.registrar > 0 {
                sink.deposit_cashback(registrar, shares.registrar, kind)?;
            }
        }

        if let Some(stats) = self.statistics.get_mut(&account_id) {
            stats.reset_pending_fees();
        }
        info!(
            account = %account_id,
            vesting_pool,
            vested_pool,
            "settled pending fees"
        );
        Ok(())
    }

    /// Per-account maintenance hook, invoked once per cycle by the
    /// maintenance driver. License-driven periodic effects happen on the
    /// other side of the license boundary.
    pub fn process_maintenance(
        &mut self,
        account_id: AccountId,
        license_type: Option<LicenseTypeId>,
        sink: &mut dyn CashbackSink,
    ) -> Result<(), StateError> {
        if let Some(license_type) = license_type {
            debug!(
                account = %account_id,
                license = %license_type,
                "license maintenance handled by license subsystem"
            );
        }
        self.process_fees(account_id, sink)
    }

    // =========================================================================
    // LOOKUPS
    // =========================================================================

    pub fn account(&self, account_id: AccountId) -> Option<&Account> {
        self.accounts.get(&account_id)
    }

    pub fn account_by_name(&self, name: &str) -> Option<AccountId> {
        self.account_names.get(name).copied()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn member_index(&self) -> &AccountMemberIndex {
        &self.member_index
    }

    pub fn referrer_index(&self) -> &AccountReferrerIndex {
        &self.referrer_index
    }
}
