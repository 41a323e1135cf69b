//! Cross-entity invariants of the account hierarchy.
//!
//! Pure checks used by the mutation path to validate a proposed entity state
//! before it is committed, and by tests to audit whole stores.

use shared_types::{TimePointSec, FULL_PERCENT};

use super::entities::Account;

/// Depth stays in {0, 1} and equals 1 exactly when the account has wallet
/// parents.
pub fn hierarchy_depth_valid(account: &Account, max_depth: u8) -> bool {
    account.hierarchy_depth <= max_depth
        && (account.hierarchy_depth == 1) == !account.parents.is_empty()
}

/// Only wallets carry tethered vaults; only vaults carry wallet parents.
pub fn kind_sets_consistent(account: &Account) -> bool {
    (account.vault.is_empty() || account.is_wallet())
        && (account.parents.is_empty() || account.is_vault())
}

/// Tethering is mutual: the vault appears in the wallet's `vault` set
/// exactly when the wallet appears in the vault's `parents` set.
pub fn tethering_symmetric(wallet: &Account, vault: &Account) -> bool {
    wallet.has_in_vault(vault.id) == vault.has_in_parents(wallet.id)
}

/// At any instant an account is exactly one of basic, annual or lifetime.
pub fn membership_exactly_one(account: &Account, now: TimePointSec) -> bool {
    let states = [
        account.is_basic_account(now),
        account.is_annual_member(now),
        account.is_lifetime_member(),
    ];
    states.iter().filter(|s| **s).count() == 1
}

/// All three fee percentages are valid basis-point values.
pub fn percentages_valid(account: &Account) -> bool {
    account.network_fee_percentage <= FULL_PERCENT
        && account.lifetime_referrer_fee_percentage <= FULL_PERCENT
        && account.referrer_rewards_percentage <= FULL_PERCENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AccountKind;
    use shared_types::{AccountId, Authority, SpecialAuthority};
    use std::collections::BTreeSet;

    fn make_account(id: u64, kind: AccountKind) -> Account {
        Account {
            id: AccountId(id),
            kind,
            hierarchy_depth: 0,
            parents: BTreeSet::new(),
            vault: BTreeSet::new(),
            disable_vault_to_wallet_limit: false,
            membership_expiration_date: TimePointSec::from_unix(0),
            registrar: AccountId(0),
            referrer: AccountId(0),
            lifetime_referrer: AccountId(0),
            network_fee_percentage: 2_000,
            lifetime_referrer_fee_percentage: 3_000,
            referrer_rewards_percentage: 0,
            name: format!("account-{id}"),
            owner: Authority::default(),
            owner_roll_back: Authority::default(),
            owner_change_counter: 0,
            active: Authority::default(),
            active_roll_back: Authority::default(),
            active_change_counter: 0,
            roll_back_enabled: true,
            roll_back_active: false,
            whitelisting_accounts: BTreeSet::new(),
            blacklisting_accounts: BTreeSet::new(),
            whitelisted_accounts: BTreeSet::new(),
            blacklisted_accounts: BTreeSet::new(),
            cashback_vb: None,
            owner_special_authority: SpecialAuthority::None,
            active_special_authority: SpecialAuthority::None,
            license_information: None,
            pi_level: 0,
            top_n_control_flags: 0,
            allowed_assets: None,
        }
    }

    #[test]
    fn test_hierarchy_depth_matches_parents() {
        let mut vault = make_account(1, AccountKind::Vault);
        assert!(hierarchy_depth_valid(&vault, 1));

        vault.parents.insert(AccountId(2));
        assert!(!hierarchy_depth_valid(&vault, 1));

        vault.hierarchy_depth = 1;
        assert!(hierarchy_depth_valid(&vault, 1));

        vault.hierarchy_depth = 2;
        assert!(!hierarchy_depth_valid(&vault, 1));
    }

    #[test]
    fn test_kind_sets_consistency() {
        let mut wallet = make_account(1, AccountKind::Wallet);
        wallet.vault.insert(AccountId(2));
        assert!(kind_sets_consistent(&wallet));

        wallet.parents.insert(AccountId(3));
        assert!(!kind_sets_consistent(&wallet));

        let mut special = make_account(4, AccountKind::Special);
        assert!(kind_sets_consistent(&special));
        special.vault.insert(AccountId(5));
        assert!(!kind_sets_consistent(&special));
    }

    #[test]
    fn test_tethering_symmetry() {
        let mut wallet = make_account(1, AccountKind::Wallet);
        let mut vault = make_account(2, AccountKind::Vault);
        assert!(tethering_symmetric(&wallet, &vault));

        wallet.vault.insert(vault.id);
        assert!(!tethering_symmetric(&wallet, &vault));

        vault.parents.insert(wallet.id);
        assert!(tethering_symmetric(&wallet, &vault));
    }

    #[test]
    fn test_membership_exactly_one_across_times() {
        let mut account = make_account(1, AccountKind::Wallet);
        for expiration in [0, 1_000, u32::MAX] {
            account.membership_expiration_date = TimePointSec::from_unix(expiration);
            for now in [0, 500, 1_000, 1_001, u32::MAX] {
                assert!(
                    membership_exactly_one(&account, TimePointSec::from_unix(now)),
                    "expiration {expiration}, now {now}"
                );
            }
        }
    }

    #[test]
    fn test_percentages_bounded() {
        let mut account = make_account(1, AccountKind::Wallet);
        assert!(percentages_valid(&account));

        account.referrer_rewards_percentage = FULL_PERCENT + 1;
        assert!(!percentages_valid(&account));
    }
}
