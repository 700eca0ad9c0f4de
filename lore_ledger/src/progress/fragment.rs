//! Lore fragment identifiers.

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Number of discoverable lore fragments.
pub const FRAGMENT_COUNT: u8 = 12;

/// Identifier of one discoverable lore fragment, always within `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FragmentId(u8);

impl FragmentId {
    /// Create a fragment id, rejecting values outside `1..=FRAGMENT_COUNT`.
    pub fn new(id: u8) -> Result<Self, LedgerError> {
        if (1..=FRAGMENT_COUNT).contains(&id) {
            Ok(Self(id))
        } else {
            Err(LedgerError::InvalidFragment(id))
        }
    }

    /// Create a fragment id in a const context; out-of-range ids fail to compile.
    pub const fn from_const(id: u8) -> Self {
        assert!(id >= 1 && id <= FRAGMENT_COUNT, "fragment id out of range");
        Self(id)
    }

    /// The raw numeric identifier.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Iterate over every valid fragment id in ascending order.
    pub fn all() -> impl Iterator<Item = FragmentId> {
        (1..=FRAGMENT_COUNT).map(FragmentId)
    }
}

impl TryFrom<u8> for FragmentId {
    type Error = LedgerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FragmentId> for u8 {
    fn from(id: FragmentId) -> Self {
        id.0
    }
}

impl std::fmt::Display for FragmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fragment #{}", self.0)
    }
}
