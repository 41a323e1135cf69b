//! # Core Value Objects
//!
//! Identifiers, amounts and asset values shared by every subsystem that
//! touches account state.
//!
//! ## Clusters
//!
//! - **Identity**: `AccountId`, `AssetId` and the opaque references into
//!   collaborating subsystems (`VestingBalanceId`, `LicenseInformationId`,
//!   `LicenseTypeId`, `OperationHistoryId`)
//! - **Value**: `Amount`, `Asset`, `AssetReserved`
//! - **Percentages**: basis-point fields and `FULL_PERCENT`

use serde::{Deserialize, Serialize};
use std::fmt;

/// An integral amount of some asset, in base units.
///
/// Signed so that deltas can be expressed directly; stored balances are kept
/// non-negative by the mutation path.
pub type Amount = i64;

/// Fee percentages are expressed in basis points: `FULL_PERCENT` == 100%.
pub const FULL_PERCENT: u16 = 10_000;

macro_rules! object_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
            Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(instance: u64) -> Self {
                Self(instance)
            }
        }
    };
}

object_id! {
    /// Stable identifier of an account. Assigned at registration, never reused.
    AccountId
}

object_id! {
    /// Stable identifier of an asset.
    AssetId
}

object_id! {
    /// Reference to a vesting balance owned by the vesting subsystem.
    VestingBalanceId
}

object_id! {
    /// Reference to a license-history record owned by the license subsystem.
    LicenseInformationId
}

object_id! {
    /// Reference to a license type owned by the license subsystem.
    LicenseTypeId
}

object_id! {
    /// Reference to a node of the externally stored operation-history chain.
    OperationHistoryId
}

/// An amount of a concrete asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub amount: Amount,
    pub asset_id: AssetId,
}

impl Asset {
    pub const fn new(amount: Amount, asset_id: AssetId) -> Self {
        Self { amount, asset_id }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.amount, self.asset_id)
    }
}

/// Combined available/reserved view of one balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReserved {
    pub amount: Amount,
    pub reserved: Amount,
    pub asset_id: AssetId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_display() {
        assert_eq!(AccountId(7).to_string(), "AccountId(7)");
        assert_eq!(AssetId::from(3).to_string(), "AssetId(3)");
    }

    #[test]
    fn test_object_id_ordering() {
        assert!(AccountId(1) < AccountId(2));
        assert_eq!(AccountId(5), AccountId(5));
    }

    #[test]
    fn test_asset_roundtrip() {
        let asset = Asset::new(1_000, AssetId(2));
        let bytes = bincode::serialize(&asset).unwrap();
        let back: Asset = bincode::deserialize(&bytes).unwrap();
        assert_eq!(asset, back);
    }
}
