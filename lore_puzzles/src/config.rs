//! Tuning for every puzzle, loadable from TOML.
//!
//! Every section falls back to its defaults, so a file only needs the keys
//! it wants to change:
//!
//! ```toml
//! [cipher]
//! time_budget_ms = 90000
//!
//! [deduction]
//! lives = 5
//! ```

use lore_ledger::FragmentId;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::placement::Region;

/// Configuration for all puzzle engines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleConfig {
    pub cipher: CipherConfig,
    pub maze: MazeConfig,
    pub stealth: StealthConfig,
    pub interrogation: InterrogationConfig,
    pub deduction: DeductionConfig,
    pub placement: PlacementConfig,
    pub allegiance: AllegianceConfig,
}

impl PuzzleConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CipherConfig {
    pub fragment: FragmentId,
    /// Letters are encoded this many positions later in the alphabet.
    pub shift: u8,
    /// Total wrong guesses that end the session.
    pub max_total_wrong: u32,
    /// Wrong guesses on one word before it is skipped.
    pub force_advance_after: u32,
    pub time_budget_ms: u64,
    pub plaintext: String,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            fragment: FragmentId::from_const(7),
            shift: 7,
            max_total_wrong: 3,
            force_advance_after: 3,
            time_budget_ms: 120_000,
            plaintext: "The archive remembers what the crown forgot".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    pub fragment: FragmentId,
    /// Chebyshev radius of the lit area around the player.
    pub visibility_radius: u32,
    /// Failed confrontations that end the session.
    pub failure_threshold: u32,
    /// Presses needed to break free of a confrontation.
    pub press_quota: u32,
    /// Time allowed to reach the press quota.
    pub press_window_ms: u64,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            fragment: FragmentId::from_const(4),
            visibility_radius: 2,
            failure_threshold: 2,
            press_quota: 12,
            press_window_ms: 4_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StealthConfig {
    pub fragment: FragmentId,
    pub visibility_radius: u32,
    /// Times the player may be caught before the session is lost.
    pub failure_threshold: u32,
    /// Participants that must be swapped to win.
    pub required_resolved: usize,
}

impl Default for StealthConfig {
    fn default() -> Self {
        Self {
            fragment: FragmentId::from_const(9),
            visibility_radius: 2,
            failure_threshold: 3,
            required_resolved: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterrogationConfig {
    pub fragment: FragmentId,
    pub strike_cap: u32,
    pub easy_count: usize,
    pub medium_count: usize,
    pub hard_count: usize,
}

impl Default for InterrogationConfig {
    fn default() -> Self {
        Self {
            fragment: FragmentId::from_const(3),
            strike_cap: 3,
            easy_count: 3,
            medium_count: 3,
            hard_count: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeductionConfig {
    pub fragment: FragmentId,
    pub rounds: usize,
    pub lives: u32,
    pub base_score: u32,
    pub clue_penalty: u32,
    pub correct_bonus: u32,
    /// Candidates shown per round, the target included.
    pub choices: usize,
    /// Identities allowed to repeat from the previous session.
    pub max_repeat: usize,
    pub sample_attempts: usize,
    /// Pause between a correct guess and the next round.
    pub advance_delay_ms: u64,
}

impl Default for DeductionConfig {
    fn default() -> Self {
        Self {
            fragment: FragmentId::from_const(5),
            rounds: 8,
            lives: 3,
            base_score: 100,
            clue_penalty: 30,
            correct_bonus: 20,
            choices: 6,
            max_repeat: 4,
            sample_attempts: 64,
            advance_delay_ms: 1_500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub fragment: FragmentId,
    pub rounds: usize,
    pub lives: u32,
    pub min_distinct_regions: usize,
    /// Regions every session must include.
    pub anchors: Vec<Region>,
    pub sample_attempts: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            fragment: FragmentId::from_const(6),
            rounds: 8,
            lives: 3,
            min_distinct_regions: 3,
            anchors: vec![Region::Highlands, Region::Coast],
            sample_attempts: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllegianceConfig {
    /// Awarded the first time any outcome is resolved.
    pub fragment: FragmentId,
}

impl Default for AllegianceConfig {
    fn default() -> Self {
        Self {
            fragment: FragmentId::from_const(2),
        }
    }
}
