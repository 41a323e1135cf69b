//! Storage-format round-trips for the persisted entities.
//!
//! Field order and optional-field presence are part of the storage contract;
//! these tests pin the encoded representation down with an exact byte-level
//! round-trip for each entity type.

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use cc_account_state::application::service::{AccountRegistration, AccountStateService};
    use cc_account_state::domain::balance::AccountBalance;
    use cc_account_state::domain::entities::{Account, AccountKind};
    use cc_account_state::domain::statistics::AccountStatistics;
    use shared_types::{
        AccountId, Asset, AssetId, Authority, LicenseInformationId, OperationHistoryId, PublicKey,
        SpecialAuthority, VestingBalanceId,
    };

    fn make_key(tag: u8) -> PublicKey {
        PublicKey([tag; 33])
    }

    fn make_account(tag: u8) -> Account {
        let mut service = AccountStateService::default();
        let id = service
            .register_account(AccountRegistration::new(
                format!("account-{tag}"),
                AccountKind::Wallet,
                AccountId(0),
                AccountId(0),
                AccountId(0),
                Authority::single_key(make_key(tag)),
                Authority::single_key(make_key(tag.wrapping_add(1))),
            ))
            .unwrap();
        service.account(id).unwrap().clone()
    }

    #[test]
    fn test_account_roundtrip_without_optionals() {
        let account = make_account(1);
        assert_eq!(account.cashback_vb, None);
        assert_eq!(account.license_information, None);
        assert_eq!(account.allowed_assets, None);

        let bytes = bincode::serialize(&account).unwrap();
        let back: Account = bincode::deserialize(&bytes).unwrap();
        assert_eq!(account, back);
        assert_eq!(back.cashback_vb, None);
    }

    #[test]
    fn test_account_roundtrip_with_optionals() {
        let mut account = make_account(2);
        account.cashback_vb = Some(VestingBalanceId(9));
        account.license_information = Some(LicenseInformationId(4));
        account.allowed_assets = Some(BTreeSet::from([AssetId(0), AssetId(3)]));
        account.owner_special_authority = SpecialAuthority::TopHolders {
            asset: AssetId(0),
            num_top_holders: 10,
        };
        account.whitelisted_accounts.insert(AccountId(77));

        let bytes = bincode::serialize(&account).unwrap();
        let back: Account = bincode::deserialize(&bytes).unwrap();
        assert_eq!(account, back);
        assert_eq!(back.allowed_assets.as_ref().map(BTreeSet::len), Some(2));

        // Presence of an optional field changes the encoding; absence is not
        // a null value.
        let mut absent = back.clone();
        absent.cashback_vb = None;
        assert_ne!(bytes, bincode::serialize(&absent).unwrap());
    }

    #[test]
    fn test_statistics_roundtrip() {
        let mut stats = AccountStatistics::new(AccountId(5));
        stats.pay_fee(1_234, 1_000_000);
        stats.record_operation(OperationHistoryId(42));
        stats.adjust_core_in_orders(500).unwrap();

        let bytes = bincode::serialize(&stats).unwrap();
        let back: AccountStatistics = bincode::deserialize(&bytes).unwrap();
        assert_eq!(stats, back);
        assert_eq!(back.most_recent_op, Some(OperationHistoryId(42)));
        assert_eq!(back.pending_fees, 1_234);
    }

    #[test]
    fn test_balance_roundtrip() {
        let mut balance = AccountBalance::new(AccountId(3), AssetId(1));
        balance.adjust_balance(Asset::new(10_000, AssetId(1))).unwrap();
        balance.adjust_reserved(Asset::new(250, AssetId(1))).unwrap();
        balance.set_limits(5_000, 4_500);
        balance.record_spent(125).unwrap();

        let bytes = bincode::serialize(&balance).unwrap();
        let back: AccountBalance = bincode::deserialize(&bytes).unwrap();
        assert_eq!(balance, back);
        assert_eq!(back.get_asset_reserved_balance().reserved, 250);
    }

    #[test]
    fn test_authority_encoding_is_stable() {
        let mut authority = Authority::single_key(make_key(7));
        authority.add_account(AccountId(3), 2);

        let first = bincode::serialize(&authority).unwrap();
        let second = bincode::serialize(&authority).unwrap();
        assert_eq!(first, second);

        let back: Authority = bincode::deserialize(&first).unwrap();
        assert_eq!(authority, back);
    }
}
