//! # Integration Test Flows
//!
//! Whole-store flows exercising the account state service the way the
//! transaction-application layer and the maintenance driver do: registration
//! networks, tethering, fee accumulation across many operations, a full
//! maintenance pass, and audits of the derived indices against the primary
//! entities.

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use cc_account_state::adapters::memory_sink::InMemoryCashbackSink;
    use cc_account_state::application::service::{AccountRegistration, AccountStateService};
    use cc_account_state::config::ChainParameters;
    use cc_account_state::domain::entities::AccountKind;
    use cc_account_state::domain::invariants;
    use rand::{Rng, SeedableRng};
    use shared_types::{AccountId, Asset, AssetId, Authority, PublicKey, TimePointSec};

    const CORE: AssetId = AssetId(0);
    const CASH: AssetId = AssetId(1);

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn make_key(tag: u8) -> PublicKey {
        PublicKey([tag; 33])
    }

    fn make_registration(name: &str, kind: AccountKind, tag: u8) -> AccountRegistration {
        AccountRegistration::new(
            name,
            kind,
            AccountId(0),
            AccountId(0),
            AccountId(0),
            Authority::single_key(make_key(tag)),
            Authority::single_key(make_key(tag.wrapping_add(128))),
        )
    }

    /// A wallet with a tethered vault, funded in both assets.
    fn make_funded_vault(service: &mut AccountStateService) -> (AccountId, AccountId) {
        let wallet = service
            .register_account(make_registration("main-wallet", AccountKind::Wallet, 1))
            .unwrap();
        let vault = service
            .register_account(make_registration("main-vault", AccountKind::Vault, 2))
            .unwrap();
        service.tether_vault(wallet, vault).unwrap();
        service.adjust_balance(vault, Asset::new(5_000, CORE)).unwrap();
        service.adjust_balance(vault, Asset::new(2_000, CASH)).unwrap();
        (wallet, vault)
    }

    // =========================================================================
    // FLOW: REGISTRATION → TETHERING → VAULT VIEW
    // =========================================================================

    #[test]
    fn test_vault_lifecycle_flow() {
        let mut service = AccountStateService::default();
        let (wallet, vault) = make_funded_vault(&mut service);

        let wallet_account = service.account(wallet).unwrap();
        let vault_account = service.account(vault).unwrap();
        assert!(invariants::tethering_symmetric(wallet_account, vault_account));
        assert!(invariants::hierarchy_depth_valid(vault_account, 1));
        assert_eq!(vault_account.hierarchy_depth, 1);
        assert_eq!(wallet_account.hierarchy_depth, 0);

        service.set_spending_limits(vault, CORE, 1_000, 900).unwrap();
        service.record_spent(vault, CORE, 300).unwrap();

        let info = service.vault_info(vault, CASH, CORE).unwrap();
        assert_eq!(info.core_balance, 5_000);
        assert_eq!(info.cash_balance, 2_000);
        assert_eq!(info.spent, 300);
        assert!(info.is_tethered);

        // The maintenance driver opens a new limit interval.
        service.reset_spent_interval(vault, CORE).unwrap();
        let info = service.vault_info(vault, CASH, CORE).unwrap();
        assert_eq!(info.spent, 0);
    }

    // =========================================================================
    // FLOW: FEES ACROSS A REFERRAL NETWORK
    // =========================================================================

    #[test]
    fn test_maintenance_settles_whole_referral_network() {
        let mut service = AccountStateService::default();

        let registrar = service
            .register_account(make_registration("registrar", AccountKind::Wallet, 10))
            .unwrap();
        let referrer = service
            .register_account(make_registration("referrer", AccountKind::Wallet, 11))
            .unwrap();
        let lifetime = service
            .register_account(make_registration("lifetime", AccountKind::Wallet, 12))
            .unwrap();

        let mut payers = Vec::new();
        let mut expected_total = 0;
        for i in 0..5 {
            let mut registration =
                make_registration(&format!("payer-{i}"), AccountKind::Wallet, 20 + i);
            registration.registrar = registrar;
            registration.referrer = referrer;
            registration.lifetime_referrer = lifetime;
            registration.network_fee_percentage = Some(2_000);
            registration.lifetime_referrer_fee_percentage = Some(3_000);
            registration.referrer_rewards_percentage = Some(5_000);
            let payer = service.register_account(registration).unwrap();

            // Several operations' worth of fees per account.
            for fee in [101, 997, 13] {
                service.pay_fee(payer, fee).unwrap();
                expected_total += fee;
            }
            payers.push(payer);
        }

        let mut sink = InMemoryCashbackSink::new();
        for payer in &payers {
            service.process_maintenance(*payer, None, &mut sink).unwrap();
        }

        // Nothing leaks: every unit paid in comes back out of settlement.
        assert_eq!(sink.grand_total(), expected_total);

        // A second maintenance pass finds nothing left to settle.
        let drained = sink.grand_total();
        for payer in &payers {
            service.process_maintenance(*payer, None, &mut sink).unwrap();
            assert_eq!(service.statistics(*payer).unwrap().pending_fees, 0);
        }
        assert_eq!(sink.grand_total(), drained);

        // Referral-chain members were paid but their own fee statistics are
        // untouched.
        assert!(sink.vesting_total(referrer) > 0);
        assert_eq!(service.statistics(referrer).unwrap().lifetime_fees_paid, 0);
    }

    #[test]
    fn test_settlement_conserves_over_random_configurations() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let mut service = AccountStateService::new(ChainParameters {
            cashback_vesting_threshold: 5_000,
            ..ChainParameters::default()
        });

        let mut total_paid = 0;
        let mut accounts = Vec::new();
        for i in 0..50u8 {
            let mut registration =
                make_registration(&format!("account-{i}"), AccountKind::Wallet, i);
            registration.network_fee_percentage = Some(rng.gen_range(0..=10_000));
            registration.lifetime_referrer_fee_percentage = Some(rng.gen_range(0..=10_000));
            registration.referrer_rewards_percentage = Some(rng.gen_range(0..=10_000));
            let id = service.register_account(registration).unwrap();

            for _ in 0..rng.gen_range(1..6) {
                let fee = rng.gen_range(0..100_000);
                service.pay_fee(id, fee).unwrap();
                total_paid += fee;
            }
            accounts.push(id);
        }

        let mut sink = InMemoryCashbackSink::new();
        for id in accounts {
            service.process_fees(id, &mut sink).unwrap();
        }
        assert_eq!(sink.grand_total(), total_paid);
    }

    // =========================================================================
    // FLOW: INDEX CONSISTENCY UNDER CHURN
    // =========================================================================

    /// Recompute the key-membership set for `key` straight from the primary
    /// entities.
    fn expected_key_members(
        service: &AccountStateService,
        accounts: &[AccountId],
        key: &PublicKey,
    ) -> BTreeSet<AccountId> {
        accounts
            .iter()
            .filter_map(|id| service.account(*id))
            .filter(|account| {
                account.owner.key_auths.contains_key(key)
                    || account.active.key_auths.contains_key(key)
            })
            .map(|account| account.id)
            .collect()
    }

    #[test]
    fn test_member_index_matches_entities_after_churn() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut service = AccountStateService::default();

        let keys: Vec<PublicKey> = (0..8).map(make_key).collect();
        let mut accounts = Vec::new();
        for i in 0..20u8 {
            let owner = Authority::single_key(keys[rng.gen_range(0..keys.len())]);
            let active = Authority::single_key(keys[rng.gen_range(0..keys.len())]);
            let id = service
                .register_account(AccountRegistration::new(
                    format!("account-{i}"),
                    AccountKind::Wallet,
                    AccountId(0),
                    AccountId(0),
                    AccountId(0),
                    owner,
                    active,
                ))
                .unwrap();
            accounts.push(id);
        }

        // Random churn: authority rewrites and a few removals.
        for _ in 0..60 {
            let id = accounts[rng.gen_range(0..accounts.len())];
            if service.account(id).is_none() {
                continue;
            }
            match rng.gen_range(0..3) {
                0 => {
                    let key = keys[rng.gen_range(0..keys.len())];
                    service
                        .update_owner_authority(id, Authority::single_key(key))
                        .unwrap();
                }
                1 => {
                    let key = keys[rng.gen_range(0..keys.len())];
                    service
                        .update_active_authority(id, Authority::single_key(key))
                        .unwrap();
                }
                _ => {
                    service.remove_account(id).unwrap();
                }
            }
        }

        for key in &keys {
            let indexed: BTreeSet<AccountId> = service
                .member_index()
                .accounts_referencing_key(key)
                .collect();
            assert_eq!(
                indexed,
                expected_key_members(&service, &accounts, key),
                "index diverged for key {key}"
            );
        }
    }

    // =========================================================================
    // FLOW: MEMBERSHIP OVER TIME
    // =========================================================================

    #[test]
    fn test_membership_transitions_with_time() {
        let mut service = AccountStateService::default();
        let mut registration = make_registration("annual", AccountKind::Wallet, 1);
        registration.membership_expiration_date = TimePointSec::from_unix(1_000);
        let annual = service.register_account(registration).unwrap();

        let mut registration = make_registration("lifetime", AccountKind::Wallet, 2);
        registration.membership_expiration_date = TimePointSec::MAXIMUM;
        let lifetime = service.register_account(registration).unwrap();

        let annual_account = service.account(annual).unwrap();
        let lifetime_account = service.account(lifetime).unwrap();

        for now in [0, 999, 1_000, 1_001, 5_000_000] {
            let now = TimePointSec::from_unix(now);
            assert!(invariants::membership_exactly_one(annual_account, now));
            assert!(invariants::membership_exactly_one(lifetime_account, now));
        }

        // The same stored state reads differently as time passes; nothing is
        // cached on the entity.
        let before = TimePointSec::from_unix(500);
        let after = TimePointSec::from_unix(1_001);
        assert!(annual_account.is_annual_member(before));
        assert!(annual_account.is_basic_account(after));
        assert!(lifetime_account.is_member(after));
    }
}
