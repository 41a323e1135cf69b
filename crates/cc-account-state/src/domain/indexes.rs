//! # Reverse-Lookup Indices
//!
//! Derived maps answering "which accounts does this principal control?" and
//! "which accounts did this account refer?" in better than linear time.
//!
//! The indices are never mutated directly. They observe the account store's
//! mutation path through [`StoreObserver`] and update themselves from
//! before/after diffs, so maintenance cost is proportional to the size of
//! the change, not to the size of the authority structures. A lookup for an
//! unknown principal yields an empty set, never an error.

use shared_types::{AccountId, Address, PublicKey};
use std::collections::{BTreeMap, BTreeSet};

use super::entities::Account;

/// Lifecycle hooks driven by the account store for every entity mutation.
///
/// `before_update` must run before the mutation is applied so the observer
/// can snapshot the state it diffs against in `after_update`. The store
/// validates the mutation before any hook fires; a rejected mutation reaches
/// no observer.
pub trait StoreObserver {
    fn inserted(&mut self, account: &Account);
    fn before_update(&mut self, before: &Account);
    fn after_update(&mut self, after: &Account);
    fn removed(&mut self, account: &Account);
}

/// Remove `account` from the sets of the principals it left, and add it to
/// the sets of the principals it joined. Principals whose set drains are
/// erased entirely.
fn apply_membership_diff<P: Ord + Copy>(
    map: &mut BTreeMap<P, BTreeSet<AccountId>>,
    account: AccountId,
    before: &BTreeSet<P>,
    after: &BTreeSet<P>,
) {
    for principal in before.difference(after) {
        if let Some(members) = map.get_mut(principal) {
            members.remove(&account);
            if members.is_empty() {
                map.remove(principal);
            }
        }
    }
    for principal in after.difference(before) {
        map.entry(*principal).or_default().insert(account);
    }
}

/// Reverse lookup from a potential signing principal (account, key or
/// address named in an `owner` or `active` authority) to the accounts whose
/// authority references it.
#[derive(Debug, Default)]
pub struct AccountMemberIndex {
    account_to_account_memberships: BTreeMap<AccountId, BTreeSet<AccountId>>,
    account_to_key_memberships: BTreeMap<PublicKey, BTreeSet<AccountId>>,
    account_to_address_memberships: BTreeMap<Address, BTreeSet<AccountId>>,

    // Snapshots taken in before_update, consumed by the matching
    // after_update.
    before_account_members: BTreeSet<AccountId>,
    before_key_members: BTreeSet<PublicKey>,
    before_address_members: BTreeSet<Address>,
}

impl AccountMemberIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts whose owner or active authority references `account`.
    pub fn accounts_referencing_account(
        &self,
        account: AccountId,
    ) -> impl Iterator<Item = AccountId> + '_ {
        self.account_to_account_memberships
            .get(&account)
            .into_iter()
            .flatten()
            .copied()
    }

    /// Accounts whose owner or active authority references `key`.
    pub fn accounts_referencing_key(
        &self,
        key: &PublicKey,
    ) -> impl Iterator<Item = AccountId> + '_ {
        self.account_to_key_memberships
            .get(key)
            .into_iter()
            .flatten()
            .copied()
    }

    /// Accounts whose owner or active authority references `address`.
    pub fn accounts_referencing_address(
        &self,
        address: &Address,
    ) -> impl Iterator<Item = AccountId> + '_ {
        self.account_to_address_memberships
            .get(address)
            .into_iter()
            .flatten()
            .copied()
    }

    fn account_members(account: &Account) -> BTreeSet<AccountId> {
        account
            .owner
            .account_auths
            .keys()
            .chain(account.active.account_auths.keys())
            .copied()
            .collect()
    }

    fn key_members(account: &Account) -> BTreeSet<PublicKey> {
        account
            .owner
            .key_auths
            .keys()
            .chain(account.active.key_auths.keys())
            .copied()
            .collect()
    }

    fn address_members(account: &Account) -> BTreeSet<Address> {
        account
            .owner
            .address_auths
            .keys()
            .chain(account.active.address_auths.keys())
            .copied()
            .collect()
    }
}

impl StoreObserver for AccountMemberIndex {
    fn inserted(&mut self, account: &Account) {
        let empty_accounts = BTreeSet::new();
        let empty_keys = BTreeSet::new();
        let empty_addresses = BTreeSet::new();

        apply_membership_diff(
            &mut self.account_to_account_memberships,
            account.id,
            &empty_accounts,
            &Self::account_members(account),
        );
        apply_membership_diff(
            &mut self.account_to_key_memberships,
            account.id,
            &empty_keys,
            &Self::key_members(account),
        );
        apply_membership_diff(
            &mut self.account_to_address_memberships,
            account.id,
            &empty_addresses,
            &Self::address_members(account),
        );
    }

    fn before_update(&mut self, before: &Account) {
        self.before_account_members = Self::account_members(before);
        self.before_key_members = Self::key_members(before);
        self.before_address_members = Self::address_members(before);
    }

    fn after_update(&mut self, after: &Account) {
        let before_accounts = std::mem::take(&mut self.before_account_members);
        let before_keys = std::mem::take(&mut self.before_key_members);
        let before_addresses = std::mem::take(&mut self.before_address_members);

        apply_membership_diff(
            &mut self.account_to_account_memberships,
            after.id,
            &before_accounts,
            &Self::account_members(after),
        );
        apply_membership_diff(
            &mut self.account_to_key_memberships,
            after.id,
            &before_keys,
            &Self::key_members(after),
        );
        apply_membership_diff(
            &mut self.account_to_address_memberships,
            after.id,
            &before_addresses,
            &Self::address_members(after),
        );
    }

    fn removed(&mut self, account: &Account) {
        // A removal is a modification towards the empty membership set.
        let empty_accounts = BTreeSet::new();
        let empty_keys = BTreeSet::new();
        let empty_addresses = BTreeSet::new();

        apply_membership_diff(
            &mut self.account_to_account_memberships,
            account.id,
            &Self::account_members(account),
            &empty_accounts,
        );
        apply_membership_diff(
            &mut self.account_to_key_memberships,
            account.id,
            &Self::key_members(account),
            &empty_keys,
        );
        apply_membership_diff(
            &mut self.account_to_address_memberships,
            account.id,
            &Self::address_members(account),
            &empty_addresses,
        );
    }
}

/// Reverse lookup from a referrer to the accounts it referred.
#[derive(Debug, Default)]
pub struct AccountReferrerIndex {
    referred_by: BTreeMap<AccountId, BTreeSet<AccountId>>,
    before_referrer: Option<AccountId>,
}

impl AccountReferrerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts naming `referrer` as their referrer.
    pub fn referred_by(&self, referrer: AccountId) -> impl Iterator<Item = AccountId> + '_ {
        self.referred_by
            .get(&referrer)
            .into_iter()
            .flatten()
            .copied()
    }

    fn unlink(&mut self, referrer: AccountId, account: AccountId) {
        if let Some(referred) = self.referred_by.get_mut(&referrer) {
            referred.remove(&account);
            if referred.is_empty() {
                self.referred_by.remove(&referrer);
            }
        }
    }
}

impl StoreObserver for AccountReferrerIndex {
    fn inserted(&mut self, account: &Account) {
        self.referred_by
            .entry(account.referrer)
            .or_default()
            .insert(account.id);
    }

    fn before_update(&mut self, before: &Account) {
        self.before_referrer = Some(before.referrer);
    }

    fn after_update(&mut self, after: &Account) {
        if let Some(before_referrer) = self.before_referrer.take() {
            if before_referrer != after.referrer {
                self.unlink(before_referrer, after.id);
                self.referred_by
                    .entry(after.referrer)
                    .or_default()
                    .insert(after.id);
            }
        }
    }

    fn removed(&mut self, account: &Account) {
        self.unlink(account.referrer, account.id);
    }
}
