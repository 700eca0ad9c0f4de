//! One-way progress flags.

use serde::{Deserialize, Serialize};

/// A one-way boolean recorded when a challenge is first passed.
///
/// Flags are set at most once and only cleared by a full wipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgressFlag {
    InterrogationPassed,
    DeductionPassed,
    PlacementPassed,
    EvasionPassed,
    CipherPassed,
    SwapPassed,
}

impl ProgressFlag {
    /// Every flag, in storage order.
    pub const ALL: [ProgressFlag; 6] = [
        ProgressFlag::InterrogationPassed,
        ProgressFlag::DeductionPassed,
        ProgressFlag::PlacementPassed,
        ProgressFlag::EvasionPassed,
        ProgressFlag::CipherPassed,
        ProgressFlag::SwapPassed,
    ];

    /// Key used for this flag in the storage record.
    pub fn key(self) -> &'static str {
        match self {
            ProgressFlag::InterrogationPassed => "interrogationPassed",
            ProgressFlag::DeductionPassed => "deductionPassed",
            ProgressFlag::PlacementPassed => "placementPassed",
            ProgressFlag::EvasionPassed => "evasionPassed",
            ProgressFlag::CipherPassed => "cipherPassed",
            ProgressFlag::SwapPassed => "swapPassed",
        }
    }

    /// Look a flag up by its storage key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.key() == key)
    }
}

impl std::fmt::Display for ProgressFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
