//! Deduction: name the figure from as few clues as possible.
//!
//! Each round shows the first of three clues and six candidates. More clues
//! cost points, wrong names cost lives.

use lore_ledger::{ProgressFlag, SharedLedger};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DeductionConfig;
use crate::error::ContentError;
use crate::events::{LossReason, SessionEvent};
use crate::sampling::{sample, sample_constrained};
use crate::session::{award, Input, Session, SessionId};

const BUILTIN_POOL: &str = include_str!("../data/deduction.json");

/// Number of clues per identity.
pub const CLUES_PER_IDENTITY: usize = 3;

/// A figure the player can be asked to identify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    /// Ordered vaguest first.
    pub clues: [String; CLUES_PER_IDENTITY],
}

impl Identity {
    /// Parse an identity pool from JSON.
    pub fn pool_from_json(raw: &str) -> Result<Vec<Identity>, ContentError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// The identity pool shipped with the crate.
    pub fn builtin_pool() -> Result<Vec<Identity>, ContentError> {
        Self::pool_from_json(BUILTIN_POOL)
    }
}

/// Points for a correct guess after `revealed` clues were shown.
///
/// The clue penalty cannot push the base below zero; the bonus is always paid.
pub fn round_score(config: &DeductionConfig, revealed: usize) -> u32 {
    let spent = revealed.saturating_sub(1) as u32;
    config
        .base_score
        .saturating_sub(spent * config.clue_penalty)
        + config.correct_bonus
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeductionPhase {
    Guessing,
    /// Pause after a correct guess before the next round.
    RoundAdvance,
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeductionCommand {
    RevealNextClue,
    /// Guess the candidate at this position in the choice list.
    Guess { choice: usize },
    /// Skip the pause between rounds.
    Continue,
}

#[derive(Debug, Clone)]
struct Round {
    target: usize,
    choices: Vec<usize>,
    eliminated: Vec<usize>,
    revealed: usize,
}

pub struct DeductionSession {
    id: SessionId,
    config: DeductionConfig,
    pool: Vec<Identity>,
    ledger: SharedLedger,
    rng: StdRng,
    previous: Vec<usize>,
    selection: Vec<usize>,
    round_index: usize,
    round: Round,
    lives: u32,
    score: u32,
    phase: DeductionPhase,
    pause_ms: u64,
}

impl DeductionSession {
    /// Start a session.
    ///
    /// `previous` is the [`selection`](Self::selection) of the last session
    /// the player saw, or empty. At most `max_repeat` of those identities
    /// come back.
    pub fn new(
        config: DeductionConfig,
        pool: Vec<Identity>,
        ledger: SharedLedger,
        mut rng: StdRng,
        previous: &[usize],
    ) -> Result<Self, ContentError> {
        let needed = config.rounds.max(config.choices).max(1);
        if pool.len() < needed {
            return Err(ContentError::PoolTooSmall {
                pool: "identities",
                needed,
                available: pool.len(),
            });
        }

        let selection = select_rounds(&config, pool.len(), previous, &mut rng);
        let round = build_round(&config, pool.len(), selection[0], &mut rng);
        let lives = config.lives;
        Ok(Self {
            id: SessionId::new(),
            config,
            pool,
            ledger,
            rng,
            previous: previous.to_vec(),
            selection,
            round_index: 0,
            round,
            lives,
            score: 0,
            phase: DeductionPhase::Guessing,
            pause_ms: 0,
        })
    }

    /// Zero-based index of the current round.
    pub fn round_index(&self) -> usize {
        self.round_index
    }

    /// Lives left before the session is lost.
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Points earned so far.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Pool indices chosen for this session's rounds.
    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    /// Clues shown so far this round.
    pub fn visible_clues(&self) -> &[String] {
        &self.pool[self.round.target].clues[..self.round.revealed]
    }

    /// Candidate names for this round, in display order.
    pub fn choices(&self) -> Vec<&str> {
        self.round
            .choices
            .iter()
            .map(|&i| self.pool[i].name.as_str())
            .collect()
    }

    /// Whether the candidate at `choice` was already guessed wrong.
    pub fn is_eliminated(&self, choice: usize) -> bool {
        self.round
            .choices
            .get(choice)
            .is_some_and(|i| self.round.eliminated.contains(i))
    }

    fn reveal(&mut self) -> Vec<SessionEvent> {
        if self.phase != DeductionPhase::Guessing || self.round.revealed >= CLUES_PER_IDENTITY {
            return Vec::new();
        }
        self.round.revealed += 1;
        vec![SessionEvent::ClueRevealed {
            round: self.round_index,
            clue: self.round.revealed - 1,
        }]
    }

    fn guess(&mut self, choice: usize) -> Vec<SessionEvent> {
        if self.phase != DeductionPhase::Guessing || self.is_eliminated(choice) {
            return Vec::new();
        }
        let Some(&picked) = self.round.choices.get(choice) else {
            return Vec::new();
        };

        if picked != self.round.target {
            self.round.eliminated.push(picked);
            self.lives = self.lives.saturating_sub(1);
            let mut events = vec![SessionEvent::LifeLost {
                remaining: self.lives,
            }];
            if self.lives == 0 {
                debug!(session = %self.id, round = self.round_index, "deduction lost");
                self.phase = DeductionPhase::Lost;
                events.push(SessionEvent::Lost {
                    reason: LossReason::LivesExhausted,
                });
            }
            return events;
        }

        let points = round_score(&self.config, self.round.revealed);
        self.score += points;
        let mut events = vec![SessionEvent::GuessScored {
            round: self.round_index,
            points,
            total: self.score,
        }];

        if self.round_index + 1 >= self.selection.len() {
            debug!(session = %self.id, score = self.score, "deduction complete");
            self.phase = DeductionPhase::Won;
            events.push(SessionEvent::Won);
            events.extend(award(
                &self.ledger,
                self.config.fragment,
                Some(ProgressFlag::DeductionPassed),
            ));
        } else {
            self.phase = DeductionPhase::RoundAdvance;
            self.pause_ms = 0;
        }
        events
    }

    fn next_round(&mut self) -> Vec<SessionEvent> {
        self.round_index += 1;
        let target = self.selection[self.round_index];
        self.round = build_round(&self.config, self.pool.len(), target, &mut self.rng);
        self.phase = DeductionPhase::Guessing;
        vec![SessionEvent::RoundStarted {
            round: self.round_index,
        }]
    }

    fn on_tick(&mut self, elapsed_ms: u64) -> Vec<SessionEvent> {
        if self.phase != DeductionPhase::RoundAdvance {
            return Vec::new();
        }
        self.pause_ms += elapsed_ms;
        if self.pause_ms < self.config.advance_delay_ms {
            return Vec::new();
        }
        self.next_round()
    }
}

/// Pick the round targets, limiting repeats from the previous session.
fn select_rounds(
    config: &DeductionConfig,
    pool_len: usize,
    previous: &[usize],
    rng: &mut StdRng,
) -> Vec<usize> {
    let indices: Vec<usize> = (0..pool_len).collect();
    let rounds = config.rounds.max(1);
    sample_constrained(&indices, rounds, rng, config.sample_attempts, |picked| {
        picked.iter().filter(|i| previous.contains(*i)).count() <= config.max_repeat
    })
    .items
}

/// The target plus random distractors, shuffled.
fn build_round(
    config: &DeductionConfig,
    pool_len: usize,
    target: usize,
    rng: &mut StdRng,
) -> Round {
    let others: Vec<usize> = (0..pool_len).filter(|&i| i != target).collect();
    let mut choices = sample(&others, config.choices.saturating_sub(1), rng);
    choices.push(target);
    choices.shuffle(rng);
    Round {
        target,
        choices,
        eliminated: Vec::new(),
        revealed: 1,
    }
}

impl Session for DeductionSession {
    type Command = DeductionCommand;
    type Phase = DeductionPhase;

    fn id(&self) -> SessionId {
        self.id
    }

    fn phase(&self) -> DeductionPhase {
        self.phase
    }

    fn is_finished(&self) -> bool {
        matches!(self.phase, DeductionPhase::Won | DeductionPhase::Lost)
    }

    fn apply(&mut self, input: Input<DeductionCommand>) -> Vec<SessionEvent> {
        match input {
            Input::Command(DeductionCommand::RevealNextClue) => self.reveal(),
            Input::Command(DeductionCommand::Guess { choice }) => self.guess(choice),
            Input::Command(DeductionCommand::Continue) => {
                if self.phase == DeductionPhase::RoundAdvance {
                    self.next_round()
                } else {
                    Vec::new()
                }
            }
            Input::Tick { elapsed_ms } => self.on_tick(elapsed_ms),
        }
    }

    fn restart(&mut self) {
        self.id = SessionId::new();
        self.previous = std::mem::take(&mut self.selection);
        self.selection =
            select_rounds(&self.config, self.pool.len(), &self.previous, &mut self.rng);
        self.round = build_round(&self.config, self.pool.len(), self.selection[0], &mut self.rng);
        self.round_index = 0;
        self.lives = self.config.lives;
        self.score = 0;
        self.phase = DeductionPhase::Guessing;
        self.pause_ms = 0;
    }
}
