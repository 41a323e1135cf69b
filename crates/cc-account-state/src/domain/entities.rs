//! # Account Entity
//!
//! The primary unit of authority on the chain. Accounts hold assets, pay
//! fees, and participate in the referral chain; vault accounts can be
//! tethered to controlling wallet accounts one level deep.
//!
//! Frequently-churning counters live in a separate
//! [`AccountStatistics`](crate::domain::statistics::AccountStatistics) record
//! so that balance- and fee-heavy traffic does not bloat the account's own
//! change history.

use serde::{Deserialize, Serialize};
use shared_types::{
    AccountId, AssetId, Authority, LicenseInformationId, SpecialAuthority, TimePointSec,
    VestingBalanceId,
};
use std::collections::BTreeSet;

use super::errors::StateError;

/// Set in `top_n_control_flags` while the owner authority is derived by the
/// top-holders logic rather than explicitly set.
pub const TOP_N_CONTROL_OWNER: u8 = 0x01;
/// Same as [`TOP_N_CONTROL_OWNER`], for the active authority.
pub const TOP_N_CONTROL_ACTIVE: u8 = 0x02;

/// What kind of account this is. Fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    /// A spending account holding hot keys.
    Wallet,
    /// A cold-storage account, optionally tethered to wallet parents.
    Vault,
    /// A chain-operated account (fee pools, treasury).
    Special,
    /// A wallet operated by a licensed custodian on behalf of its users.
    Custodian,
}

/// Listing status one account assigns to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountListing {
    NoListing,
    WhiteListed,
    BlackListed,
}

/// An account on the object graph.
///
/// Field order is the storage contract; optional fields round-trip as
/// present/absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Stable identity assigned at registration. Never reused.
    pub id: AccountId,

    pub kind: AccountKind,

    /// 0 for an untethered wallet or vault, 1 for a vault tethered to a
    /// wallet. Deeper nesting is rejected by the mutation path.
    pub hierarchy_depth: u8,

    /// Wallet parents of this vault. Non-empty only when `kind` is `Vault`.
    pub parents: BTreeSet<AccountId>,

    /// Vaults tethered to this wallet. Non-empty only when `kind` is `Wallet`.
    pub vault: BTreeSet<AccountId>,

    /// When true, a vault observes no limit on vault-to-wallet transfers.
    pub disable_vault_to_wallet_limit: bool,

    /// Membership status is always derived from this timestamp and a
    /// caller-supplied "now"; no status enum is ever stored. In the past:
    /// basic account. Equal to [`TimePointSec::MAXIMUM`]: lifetime member.
    /// Anything else in the future: annual member.
    pub membership_expiration_date: TimePointSec,

    /// The account that paid the registration fee. Receives the residual
    /// share of settled fees.
    pub registrar: AccountId,
    /// The account credited with referring this one.
    pub referrer: AccountId,
    /// The lifetime member at the top of the referral tree.
    pub lifetime_referrer: AccountId,

    /// Share of settled fees removed to the network, in basis points.
    pub network_fee_percentage: u16,
    /// Share of the post-network remainder paid to the lifetime referrer.
    pub lifetime_referrer_fee_percentage: u16,
    /// Share of the referral reward (what remains after the network and
    /// lifetime-referrer cuts) paid to the referrer; the registrar keeps the
    /// rest.
    pub referrer_rewards_percentage: u16,

    /// Unique, non-empty account name.
    pub name: String,

    /// Absolute control over the account. Compromise of these keys is
    /// irrevocable loss, so they are expected to stay cold.
    pub owner: Authority,

    /// Backup of the previous owner authority, swapped in by key rollback.
    pub owner_roll_back: Authority,

    /// How many times the owner authority has been replaced.
    pub owner_change_counter: u32,

    /// The hot authority controlling day-to-day operations.
    pub active: Authority,

    /// Backup of the previous active authority, swapped in by key rollback.
    pub active_roll_back: Authority,

    /// How many times the active authority has been replaced.
    pub active_change_counter: u32,

    /// Whether the account has opted in to the key-rollback feature.
    pub roll_back_enabled: bool,

    /// One-shot flag raised by key rollback. While set, only key replacement
    /// may be applied; completing it clears the flag.
    pub roll_back_active: bool,

    /// Accounts that have whitelisted this one. Mutated only by those
    /// accounts, never by this one.
    pub whitelisting_accounts: BTreeSet<AccountId>,

    /// Accounts that have blacklisted this one. Mutated only by those
    /// accounts; survives ownership transfer.
    pub blacklisting_accounts: BTreeSet<AccountId>,

    /// Accounts this one has whitelisted. Display-only.
    pub whitelisted_accounts: BTreeSet<AccountId>,

    /// Accounts this one has blacklisted. Display-only.
    pub blacklisted_accounts: BTreeSet<AccountId>,

    /// Vesting balance receiving fee cashback, once one exists.
    pub cashback_vb: Option<VestingBalanceId>,

    pub owner_special_authority: SpecialAuthority,
    pub active_special_authority: SpecialAuthority,

    /// History of license purchases and upgrades, held by the license
    /// subsystem.
    pub license_information: Option<LicenseInformationId>,

    /// Verified personal-information tier.
    pub pi_level: u8,

    /// Which authorities were derived by the top-holders logic. Cleared when
    /// an authority or special authority is explicitly set.
    pub top_n_control_flags: u8,

    /// When present, the only assets this account may hold.
    pub allowed_assets: Option<BTreeSet<AssetId>>,
}

impl Account {
    pub fn is_wallet(&self) -> bool {
        self.kind == AccountKind::Wallet
    }

    pub fn is_vault(&self) -> bool {
        self.kind == AccountKind::Vault
    }

    pub fn is_special(&self) -> bool {
        self.kind == AccountKind::Special
    }

    pub fn is_custodian(&self) -> bool {
        self.kind == AccountKind::Custodian
    }

    /// True when this account participates in any tether, on either side.
    pub fn is_tethered(&self) -> bool {
        !self.vault.is_empty() || !self.parents.is_empty()
    }

    pub fn is_tethered_to(&self, account: AccountId) -> bool {
        self.vault.contains(&account) || self.parents.contains(&account)
    }

    pub fn has_in_vault(&self, account: AccountId) -> bool {
        self.vault.contains(&account)
    }

    pub fn has_in_parents(&self, account: AccountId) -> bool {
        self.parents.contains(&account)
    }

    pub fn is_lifetime_member(&self) -> bool {
        self.membership_expiration_date == TimePointSec::MAXIMUM
    }

    pub fn is_basic_account(&self, now: TimePointSec) -> bool {
        now > self.membership_expiration_date
    }

    /// True for an unexpired annual member; false for lifetime members.
    pub fn is_annual_member(&self, now: TimePointSec) -> bool {
        !self.is_lifetime_member() && !self.is_basic_account(now)
    }

    pub fn is_member(&self, now: TimePointSec) -> bool {
        !self.is_basic_account(now)
    }

    pub fn has_special_authority(&self) -> bool {
        self.owner_special_authority.is_set() || self.active_special_authority.is_set()
    }

    /// The vesting balance receiving this account's cashback.
    ///
    /// Accessing it before any cashback has been deposited is a precondition
    /// violation, fatal to the calling operation.
    pub fn cashback_balance(&self) -> Result<VestingBalanceId, StateError> {
        self.cashback_vb
            .ok_or(StateError::NoCashbackBalance { account: self.id })
    }

    /// Explicitly replace the owner authority, backing up the previous one
    /// for rollback and clearing the derived-control flag.
    pub fn replace_owner_authority(&mut self, new_owner: Authority) {
        self.owner_roll_back = std::mem::replace(&mut self.owner, new_owner);
        self.owner_change_counter += 1;
        self.top_n_control_flags &= !TOP_N_CONTROL_OWNER;
    }

    /// Explicitly replace the active authority; see
    /// [`replace_owner_authority`](Self::replace_owner_authority).
    pub fn replace_active_authority(&mut self, new_active: Authority) {
        self.active_roll_back = std::mem::replace(&mut self.active, new_active);
        self.active_change_counter += 1;
        self.top_n_control_flags &= !TOP_N_CONTROL_ACTIVE;
    }

    /// Explicitly set the special authorities. Clears both derived-control
    /// flags.
    pub fn set_special_authorities(&mut self, owner: SpecialAuthority, active: SpecialAuthority) {
        self.owner_special_authority = owner;
        self.active_special_authority = active;
        self.top_n_control_flags = 0;
    }

    /// Install authorities derived by the top-holders logic, recording which
    /// of the two were derived rather than explicitly set.
    pub fn apply_derived_authorities(
        &mut self,
        owner: Option<Authority>,
        active: Option<Authority>,
    ) {
        if let Some(owner) = owner {
            self.owner = owner;
            self.top_n_control_flags |= TOP_N_CONTROL_OWNER;
        }
        if let Some(active) = active {
            self.active = active;
            self.top_n_control_flags |= TOP_N_CONTROL_ACTIVE;
        }
    }

    /// Swap the rollback backups in as the current authorities and raise the
    /// one-shot rollback flag. Guards live on the mutation path.
    pub fn roll_back_keys(&mut self) {
        self.owner = self.owner_roll_back.clone();
        self.active = self.active_roll_back.clone();
        self.roll_back_active = true;
    }
}
