//! # Authority Structures
//!
//! The weighted-threshold control structures attached to every account. An
//! [`Authority`] names the principals (accounts, public keys, addresses) that
//! may sign on the account's behalf and the weight each contributes; the
//! threshold-evaluation algorithm itself lives in the signature-validation
//! subsystem and is not implemented here.

use crate::entities::{AccountId, AssetId};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::collections::BTreeMap;
use std::fmt;

/// A 33-byte compressed public key.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublicKey(#[serde_as(as = "Bytes")] pub [u8; 33]);

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A 20-byte account address. Only present in authorities imported from the
/// genesis block.
pub type Address = [u8; 20];

/// Weight contributed by a single principal towards an authority threshold.
pub type Weight = u16;

/// A weighted-threshold authority over accounts, keys and addresses.
///
/// The authority is satisfied when the weights of the approving principals
/// sum to at least `weight_threshold`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Authority {
    pub weight_threshold: u32,
    pub account_auths: BTreeMap<AccountId, Weight>,
    pub key_auths: BTreeMap<PublicKey, Weight>,
    pub address_auths: BTreeMap<Address, Weight>,
}

impl Authority {
    /// An authority satisfied by a single key.
    pub fn single_key(key: PublicKey) -> Self {
        let mut auth = Self {
            weight_threshold: 1,
            ..Default::default()
        };
        auth.key_auths.insert(key, 1);
        auth
    }

    /// An authority satisfied by a single account.
    pub fn single_account(account: AccountId) -> Self {
        let mut auth = Self {
            weight_threshold: 1,
            ..Default::default()
        };
        auth.account_auths.insert(account, 1);
        auth
    }

    pub fn add_account(&mut self, account: AccountId, weight: Weight) -> &mut Self {
        self.account_auths.insert(account, weight);
        self
    }

    pub fn add_key(&mut self, key: PublicKey, weight: Weight) -> &mut Self {
        self.key_auths.insert(key, weight);
        self
    }

    pub fn num_auths(&self) -> usize {
        self.account_auths.len() + self.key_auths.len() + self.address_auths.len()
    }

    /// True when no combination of principals can reach the threshold.
    pub fn is_impossible(&self) -> bool {
        let total: u64 = self
            .account_auths
            .values()
            .chain(self.key_auths.values())
            .chain(self.address_auths.values())
            .map(|w| u64::from(*w))
            .sum();
        total < u64::from(self.weight_threshold)
    }
}

/// Alternative control mechanism that can replace key-based authority with a
/// rule derived from another part of the chain state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpecialAuthority {
    /// Plain key/account authority applies.
    #[default]
    None,
    /// Control is delegated to the top holders of an asset; the authority is
    /// re-derived from the holder ranking each maintenance cycle.
    TopHolders {
        asset: AssetId,
        num_top_holders: u8,
    },
}

impl SpecialAuthority {
    pub fn is_set(&self) -> bool {
        !matches!(self, SpecialAuthority::None)
    }
}
