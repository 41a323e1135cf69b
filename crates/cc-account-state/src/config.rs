//! Chain-level defaults and limits applied by the account store.
//!
//! Settlement itself never reads ambient configuration; these values enter
//! either at registration time (fee percentage defaults) or as explicit
//! parameters of the store.

use shared_types::Amount;

#[derive(Clone, Debug)]
pub struct ChainParameters {
    /// Default share of settled fees removed to the network, in basis
    /// points, applied to newly registered accounts.
    pub default_network_fee_percentage: u16,
    /// Default lifetime-referrer share for newly registered accounts.
    pub default_lifetime_referrer_fee_percentage: u16,
    /// Default referrer share of the referral reward.
    pub default_referrer_rewards_percentage: u16,
    /// Lifetime fees an account must have paid before further cashback is
    /// credited as immediately withdrawable instead of vesting.
    pub cashback_vesting_threshold: Amount,
    /// Maximum tethering depth. 1 allows a vault under a wallet and nothing
    /// deeper.
    pub maximum_hierarchy_depth: u8,
}

impl Default for ChainParameters {
    fn default() -> Self {
        Self {
            default_network_fee_percentage: 2_000,
            default_lifetime_referrer_fee_percentage: 3_000,
            default_referrer_rewards_percentage: 0,
            cashback_vesting_threshold: 10_000_000,
            maximum_hierarchy_depth: 1,
        }
    }
}
