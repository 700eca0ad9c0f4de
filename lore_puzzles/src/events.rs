//! Events emitted by puzzle sessions for the presentation layer.

use lore_ledger::{AllegianceOutcome, FragmentId, ProgressFlag};
use serde::{Deserialize, Serialize};

use crate::grid::Position;
use crate::placement::Region;

/// Why a session ended in failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossReason {
    /// Too many wrong answers.
    StrikesExhausted,
    /// The countdown reached zero.
    TimeExpired,
    /// No lives left.
    LivesExhausted,
    /// Too many failed confrontations.
    Caught,
}

/// Something noteworthy that happened while applying an input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The unlock command was issued to the ledger.
    FragmentUnlocked { fragment: FragmentId, was_new: bool },

    /// A one-way ledger flag was set for the first time.
    FirstCompletion { flag: ProgressFlag },

    Won,

    Lost { reason: LossReason },

    /// The antagonist proxy moved one step closer.
    PursuerAdvanced { step: u32, of: u32 },

    // Cipher
    WordSolved { index: usize, forced: bool },
    HintRevealed { tier: u8 },

    // Grid
    AgentActivated { agent: usize },
    Confronted { agent: usize, at: Position },
    ConfrontationResolved,
    ConfrontationFailed { failures: u32 },
    ParticipantResolved { participant: usize },

    // Interrogation
    /// A true loyalty statement was denied. Cosmetic only.
    LoyaltyBreach { question: usize },

    // Deduction / placement
    RoundStarted { round: usize },
    ClueRevealed { round: usize, clue: usize },
    GuessScored { round: usize, points: u32, total: u32 },
    LifeLost { remaining: u32 },
    Misplaced { entity: String, chosen: Region, correct: Region },

    // Allegiance
    AllegianceResolved { outcome: AllegianceOutcome },
}
