//! Cipher decoding challenge.
//!
//! The player decodes a shift-ciphered phrase one word at a time against a
//! countdown. Misses raise the hint tier for the current word and move the
//! pursuer closer.

mod codec;

pub use codec::*;

use lore_ledger::{ProgressFlag, SharedLedger};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CipherConfig;
use crate::error::ContentError;
use crate::events::{LossReason, SessionEvent};
use crate::session::{award, Input, Session, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CipherPhase {
    Decoding,
    Won,
    Lost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CipherCommand {
    SubmitGuess(String),
}

/// One word of the phrase in both forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherWord {
    /// Normalized plaintext, compared against normalized guesses.
    pub plain: String,
    /// The word as shown to the player.
    pub cipher: String,
}

/// State of one cipher run.
pub struct CipherSession {
    id: SessionId,
    config: CipherConfig,
    ledger: SharedLedger,
    words: Vec<CipherWord>,
    phase: CipherPhase,
    current: usize,
    wrong_this_word: u32,
    total_wrong: u32,
    remaining_ms: u64,
}

impl CipherSession {
    pub fn new(config: CipherConfig, ledger: SharedLedger) -> Result<Self, ContentError> {
        let words: Vec<CipherWord> = config
            .plaintext
            .split_whitespace()
            .map(|word| CipherWord {
                plain: normalize_guess(word),
                cipher: encode_shift(word, config.shift),
            })
            .filter(|word| !word.plain.is_empty())
            .collect();

        if words.is_empty() {
            return Err(ContentError::EmptyText);
        }

        let remaining_ms = config.time_budget_ms;
        Ok(Self {
            id: SessionId::new(),
            config,
            ledger,
            words,
            phase: CipherPhase::Decoding,
            current: 0,
            wrong_this_word: 0,
            total_wrong: 0,
            remaining_ms,
        })
    }

    /// The sentence split into words, in play order.
    pub fn words(&self) -> &[CipherWord] {
        &self.words
    }

    /// Zero-based index of the word being decoded.
    pub fn current_word_index(&self) -> usize {
        self.current
    }

    /// The ciphered word the player is working on.
    pub fn current_cipher_word(&self) -> Option<&str> {
        match self.phase {
            CipherPhase::Decoding => self.words.get(self.current).map(|w| w.cipher.as_str()),
            _ => None,
        }
    }

    pub fn hint_tier(&self) -> HintTier {
        HintTier::for_misses(self.wrong_this_word)
    }

    /// Masked plaintext of the current word at the current hint tier.
    pub fn hint(&self) -> Option<String> {
        match self.phase {
            CipherPhase::Decoding => self
                .words
                .get(self.current)
                .map(|w| self.hint_tier().mask(&w.plain)),
            _ => None,
        }
    }

    /// Misses on the current word.
    pub fn wrong_attempts_this_word(&self) -> u32 {
        self.wrong_this_word
    }

    /// Misses across the whole session.
    pub fn total_wrong_attempts(&self) -> u32 {
        self.total_wrong
    }

    /// How close the pursuer is, out of `max_total_wrong`.
    pub fn pursuer_step(&self) -> u32 {
        self.total_wrong
    }

    /// Time left on the countdown.
    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    fn submit(&mut self, guess: &str) -> Vec<SessionEvent> {
        let guess = normalize_guess(guess);
        if guess.is_empty() {
            return Vec::new();
        }

        if guess == self.words[self.current].plain {
            let mut events = vec![SessionEvent::WordSolved {
                index: self.current,
                forced: false,
            }];
            events.extend(self.advance());
            return events;
        }

        self.wrong_this_word += 1;
        self.total_wrong += 1;
        let mut events = vec![SessionEvent::PursuerAdvanced {
            step: self.total_wrong,
            of: self.config.max_total_wrong,
        }];

        if self.total_wrong >= self.config.max_total_wrong {
            debug!(session = %self.id, "cipher lost on wrong attempts");
            self.phase = CipherPhase::Lost;
            events.push(SessionEvent::Lost {
                reason: LossReason::StrikesExhausted,
            });
        } else if self.wrong_this_word >= self.config.force_advance_after {
            events.push(SessionEvent::WordSolved {
                index: self.current,
                forced: true,
            });
            events.extend(self.advance());
        } else {
            events.push(SessionEvent::HintRevealed {
                tier: self.hint_tier().level(),
            });
        }
        events
    }

    fn advance(&mut self) -> Vec<SessionEvent> {
        self.current += 1;
        self.wrong_this_word = 0;
        if self.current < self.words.len() {
            return Vec::new();
        }

        debug!(session = %self.id, wrong = self.total_wrong, "cipher decoded");
        self.phase = CipherPhase::Won;
        let mut events = vec![SessionEvent::Won];
        events.extend(award(
            &self.ledger,
            self.config.fragment,
            Some(ProgressFlag::CipherPassed),
        ));
        events
    }

    fn count_down(&mut self, elapsed_ms: u64) -> Vec<SessionEvent> {
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed_ms);
        if self.remaining_ms > 0 {
            return Vec::new();
        }
        debug!(session = %self.id, "cipher countdown expired");
        self.phase = CipherPhase::Lost;
        vec![SessionEvent::Lost {
            reason: LossReason::TimeExpired,
        }]
    }
}

impl Session for CipherSession {
    type Command = CipherCommand;
    type Phase = CipherPhase;

    fn id(&self) -> SessionId {
        self.id
    }

    fn phase(&self) -> CipherPhase {
        self.phase
    }

    fn is_finished(&self) -> bool {
        self.phase != CipherPhase::Decoding
    }

    fn apply(&mut self, input: Input<CipherCommand>) -> Vec<SessionEvent> {
        if self.is_finished() {
            debug!(session = %self.id, "input ignored, cipher finished");
            return Vec::new();
        }
        match input {
            Input::Command(CipherCommand::SubmitGuess(guess)) => self.submit(&guess),
            Input::Tick { elapsed_ms } => self.count_down(elapsed_ms),
        }
    }

    fn restart(&mut self) {
        self.id = SessionId::new();
        self.phase = CipherPhase::Decoding;
        self.current = 0;
        self.wrong_this_word = 0;
        self.total_wrong = 0;
        self.remaining_ms = self.config.time_budget_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lore_ledger::{MemoryStore, ProgressionLedger};

    fn session(plaintext: &str) -> (CipherSession, SharedLedger) {
        let ledger = ProgressionLedger::shared(MemoryStore::new());
        let config = CipherConfig {
            plaintext: plaintext.to_string(),
            ..CipherConfig::default()
        };
        (CipherSession::new(config, ledger.clone()).unwrap(), ledger)
    }

    fn guess(session: &mut CipherSession, text: &str) -> Vec<SessionEvent> {
        session.command(CipherCommand::SubmitGuess(text.to_string()))
    }

    #[test]
    fn test_words_are_encoded() {
        let (session, _) = session("Crown, falls");
        assert_eq!(session.words()[0].plain, "crown");
        assert_eq!(session.words()[0].cipher, "Jyvdu,");
        assert_eq!(session.current_cipher_word(), Some("Jyvdu,"));
    }

    #[test]
    fn test_empty_plaintext_rejected() {
        let ledger = ProgressionLedger::shared(MemoryStore::new());
        let config = CipherConfig {
            plaintext: " ... !! ".to_string(),
            ..CipherConfig::default()
        };
        assert!(matches!(
            CipherSession::new(config, ledger),
            Err(ContentError::EmptyText)
        ));
    }

    #[test]
    fn test_solving_every_word_wins_and_unlocks() {
        let (mut session, ledger) = session("the crown forgot");

        guess(&mut session, "The");
        guess(&mut session, "CROWN!");
        let events = guess(&mut session, "forgot");

        assert_eq!(session.phase(), CipherPhase::Won);
        assert!(events.contains(&SessionEvent::Won));
        assert!(events.contains(&SessionEvent::FragmentUnlocked {
            fragment: CipherConfig::default().fragment,
            was_new: true,
        }));
        assert!(ledger.borrow().is_flag_set(ProgressFlag::CipherPassed));
    }

    #[test]
    fn test_wrong_guess_raises_hint_tier() {
        let (mut session, _) = session("archive");

        assert_eq!(session.hint().as_deref(), Some("_______"));
        let events = guess(&mut session, "arcade");
        assert_eq!(events.last(), Some(&SessionEvent::HintRevealed { tier: 1 }));
        assert_eq!(session.hint().as_deref(), Some("a_____e"));

        guess(&mut session, "anthem");
        assert_eq!(session.hint().as_deref(), Some("_rch_v_"));
        assert_eq!(session.total_wrong_attempts(), 2);
    }

    #[test]
    fn test_correct_guess_resets_word_counter() {
        let (mut session, _) = session("the crown");

        guess(&mut session, "tha");
        assert_eq!(session.wrong_attempts_this_word(), 1);
        guess(&mut session, "the");

        assert_eq!(session.current_word_index(), 1);
        assert_eq!(session.wrong_attempts_this_word(), 0);
        assert_eq!(session.total_wrong_attempts(), 1);
        assert_eq!(session.hint_tier(), HintTier::Length);
    }

    #[test]
    fn test_three_total_misses_lose() {
        let (mut session, ledger) = session("the crown forgot");

        guess(&mut session, "x");
        guess(&mut session, "the");
        guess(&mut session, "y");
        let events = guess(&mut session, "z");

        assert_eq!(session.phase(), CipherPhase::Lost);
        assert!(events.contains(&SessionEvent::Lost {
            reason: LossReason::StrikesExhausted
        }));
        assert_eq!(ledger.borrow().progress().unlocked, 0);
    }

    #[test]
    fn test_third_miss_on_word_force_advances_when_cap_allows() {
        let ledger = ProgressionLedger::shared(MemoryStore::new());
        let config = CipherConfig {
            plaintext: "the crown".to_string(),
            max_total_wrong: 5,
            ..CipherConfig::default()
        };
        let mut session = CipherSession::new(config, ledger).unwrap();

        guess(&mut session, "a");
        guess(&mut session, "b");
        let events = guess(&mut session, "c");

        assert!(events.contains(&SessionEvent::WordSolved { index: 0, forced: true }));
        assert_eq!(session.current_word_index(), 1);
        assert_eq!(session.total_wrong_attempts(), 3);
        assert_eq!(session.phase(), CipherPhase::Decoding);
    }

    #[test]
    fn test_countdown_expiry_loses() {
        let (mut session, _) = session("the crown");
        let budget = session.remaining_ms();

        assert!(session.tick(budget - 1).is_empty());
        let events = session.tick(1);

        assert_eq!(session.phase(), CipherPhase::Lost);
        assert_eq!(
            events,
            vec![SessionEvent::Lost { reason: LossReason::TimeExpired }]
        );
    }

    #[test]
    fn test_input_after_finish_is_ignored() {
        let (mut session, _) = session("the");
        guess(&mut session, "the");
        assert_eq!(session.phase(), CipherPhase::Won);

        assert!(guess(&mut session, "anything").is_empty());
        assert!(session.tick(1_000_000).is_empty());
        assert_eq!(session.phase(), CipherPhase::Won);
    }

    #[test]
    fn test_restart_resets_without_touching_ledger() {
        let (mut session, ledger) = session("the crown");
        guess(&mut session, "nope");
        session.tick(5_000);
        let old_id = session.id();

        session.restart();

        assert_ne!(session.id(), old_id);
        assert_eq!(session.total_wrong_attempts(), 0);
        assert_eq!(session.current_word_index(), 0);
        assert_eq!(session.remaining_ms(), CipherConfig::default().time_budget_ms);
        assert_eq!(ledger.borrow().progress().unlocked, 0);
    }

    #[test]
    fn test_blank_guess_changes_nothing() {
        let (mut session, _) = session("the");
        assert!(guess(&mut session, " ?! ").is_empty());
        assert_eq!(session.total_wrong_attempts(), 0);
    }
}
