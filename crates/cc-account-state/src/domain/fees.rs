//! # Fee Split Arithmetic
//!
//! Pure integer arithmetic for the maintenance-cycle fee settlement. A
//! pending-fee pool is divided between the network, the lifetime referrer,
//! the referrer and the registrar in that fixed order; every integer-division
//! remainder falls through to the registrar, the last party in the chain, so
//! the four shares always reconstruct the pool exactly.
//!
//! The percentages are taken from the paying account; global defaults only
//! enter at registration time. Keeping this module free of store access makes
//! the conservation property testable in isolation.

use shared_types::{Amount, FULL_PERCENT};

/// `amount * basis_points / 100%`, rounded towards zero.
///
/// Widens to 128 bits internally so the multiplication cannot overflow for
/// any representable amount.
pub fn cut_fee(amount: Amount, basis_points: u16) -> Amount {
    if amount == 0 || basis_points == 0 {
        return 0;
    }
    if basis_points >= FULL_PERCENT {
        return amount;
    }
    (i128::from(amount) * i128::from(basis_points) / i128::from(FULL_PERCENT)) as Amount
}

/// The four-way division of one settled fee pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeShares {
    /// Removed from circulation; not paid to any account.
    pub network: Amount,
    pub lifetime_referrer: Amount,
    pub referrer: Amount,
    /// Residual share; absorbs all rounding remainders.
    pub registrar: Amount,
}

impl FeeShares {
    pub fn total(&self) -> Amount {
        self.network + self.lifetime_referrer + self.referrer + self.registrar
    }
}

/// Split `total` into network / lifetime-referrer / referrer / registrar
/// shares.
///
/// Each percentage applies to what remains after the cuts before it:
/// the network takes its share of the whole pool, the lifetime referrer of
/// the remainder, the referrer of the remainder after that, and the
/// registrar keeps the rest. The shares sum to `total` exactly.
pub fn split_fee(
    total: Amount,
    network_fee_percentage: u16,
    lifetime_referrer_fee_percentage: u16,
    referrer_rewards_percentage: u16,
) -> FeeShares {
    let network = cut_fee(total, network_fee_percentage);

    let after_network = total - network;
    let lifetime_referrer = cut_fee(after_network, lifetime_referrer_fee_percentage);

    let referral_reward = after_network - lifetime_referrer;
    let referrer = cut_fee(referral_reward, referrer_rewards_percentage);
    let registrar = referral_reward - referrer;

    FeeShares {
        network,
        lifetime_referrer,
        referrer,
        registrar,
    }
}
