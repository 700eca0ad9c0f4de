//! Allegiance categories and quiz outcomes.

use serde::{Deserialize, Serialize};

/// The four houses a player can be sorted into.
///
/// Declaration order is the static tie-break priority: earlier wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Allegiance {
    Aurum,
    Bastion,
    Cinder,
    Drift,
}

impl Allegiance {
    /// All allegiances in priority order.
    pub const ALL: [Allegiance; 4] = [
        Allegiance::Aurum,
        Allegiance::Bastion,
        Allegiance::Cinder,
        Allegiance::Drift,
    ];

    /// Position in the static tie-break order (0 is highest priority).
    pub fn priority(self) -> usize {
        self as usize
    }
}

/// Result of an allegiance quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllegianceOutcome {
    Aurum,
    Bastion,
    Cinder,
    Drift,
    /// Every allegiance scored the same.
    Unaligned,
}

impl AllegianceOutcome {
    /// The allegiance this outcome names, if any.
    pub fn allegiance(self) -> Option<Allegiance> {
        match self {
            AllegianceOutcome::Aurum => Some(Allegiance::Aurum),
            AllegianceOutcome::Bastion => Some(Allegiance::Bastion),
            AllegianceOutcome::Cinder => Some(Allegiance::Cinder),
            AllegianceOutcome::Drift => Some(Allegiance::Drift),
            AllegianceOutcome::Unaligned => None,
        }
    }
}

impl From<Allegiance> for AllegianceOutcome {
    fn from(allegiance: Allegiance) -> Self {
        match allegiance {
            Allegiance::Aurum => AllegianceOutcome::Aurum,
            Allegiance::Bastion => AllegianceOutcome::Bastion,
            Allegiance::Cinder => AllegianceOutcome::Cinder,
            Allegiance::Drift => AllegianceOutcome::Drift,
        }
    }
}
