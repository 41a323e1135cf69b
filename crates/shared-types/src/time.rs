//! Second-resolution timestamps.
//!
//! Chain state never stores a derived "now"-dependent status; predicates take
//! the current time as an argument and compare against stored time points.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in time with one-second resolution, seconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TimePointSec(pub u32);

impl TimePointSec {
    /// The largest representable time point. Used as the "never expires"
    /// sentinel, e.g. for lifetime memberships.
    pub const MAXIMUM: TimePointSec = TimePointSec(u32::MAX);

    pub const fn from_unix(seconds: u32) -> Self {
        Self(seconds)
    }

    pub const fn seconds(self) -> u32 {
        self.0
    }

    pub const fn saturating_add(self, seconds: u32) -> Self {
        Self(self.0.saturating_add(seconds))
    }
}

impl fmt::Display for TimePointSec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::MAXIMUM {
            write!(f, "never")
        } else {
            write!(f, "{}s", self.0)
        }
    }
}
