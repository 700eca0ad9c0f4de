//! Interrogation: answer true or false before the inquisitor closes in.
//!
//! A session samples statements from three difficulty pools and always ends
//! with the fixed loyalty block. Every wrong answer is a strike and moves
//! the inquisitor one step closer.

use lore_ledger::{ProgressFlag, SharedLedger};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::InterrogationConfig;
use crate::error::ContentError;
use crate::events::{LossReason, SessionEvent};
use crate::sampling::sample;
use crate::session::{award, Input, Session, SessionId};

const BUILTIN_BANK: &str = include_str!("../data/interrogation.json");

/// A statement with its ground truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub text: String,
    pub truth: bool,
}

/// Statement pools for the interrogation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterrogationBank {
    pub easy: Vec<Statement>,
    pub medium: Vec<Statement>,
    pub hard: Vec<Statement>,
    /// Asked last, in this order, every session.
    pub loyalty: Vec<Statement>,
}

impl InterrogationBank {
    /// Parse a statement bank from JSON.
    pub fn from_json(raw: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// The statement bank shipped with the crate.
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_json(BUILTIN_BANK)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    Ranked(Difficulty),
    Loyalty,
}

/// One question as asked in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub truth: bool,
    pub kind: QuestionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterrogationPhase {
    Asking,
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterrogationCommand {
    Answer(bool),
}

pub struct InterrogationSession {
    id: SessionId,
    config: InterrogationConfig,
    bank: InterrogationBank,
    ledger: SharedLedger,
    rng: StdRng,
    questions: Vec<Question>,
    index: usize,
    strikes: u32,
    phase: InterrogationPhase,
}

impl InterrogationSession {
    pub fn new(
        config: InterrogationConfig,
        bank: InterrogationBank,
        ledger: SharedLedger,
        mut rng: StdRng,
    ) -> Result<Self, ContentError> {
        for (pool, statements, needed) in [
            ("easy", &bank.easy, config.easy_count),
            ("medium", &bank.medium, config.medium_count),
            ("hard", &bank.hard, config.hard_count),
        ] {
            if statements.len() < needed {
                return Err(ContentError::PoolTooSmall {
                    pool,
                    needed,
                    available: statements.len(),
                });
            }
        }

        let questions = assemble(&config, &bank, &mut rng);
        Ok(Self {
            id: SessionId::new(),
            config,
            bank,
            ledger,
            rng,
            questions,
            index: 0,
            strikes: 0,
            phase: InterrogationPhase::Asking,
        })
    }

    /// Statements in the order they are asked.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// The statement awaiting an answer.
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            InterrogationPhase::Asking => self.questions.get(self.index),
            _ => None,
        }
    }

    /// Zero-based index of the current statement.
    pub fn question_index(&self) -> usize {
        self.index
    }

    /// Wrong answers so far.
    pub fn strikes(&self) -> u32 {
        self.strikes
    }

    fn answer(&mut self, answer: bool) -> Vec<SessionEvent> {
        let Some(question) = self.questions.get(self.index) else {
            return Vec::new();
        };

        if answer == question.truth {
            self.index += 1;
            return if self.index == self.questions.len() {
                self.win()
            } else {
                Vec::new()
            };
        }

        let mut events = Vec::new();
        if question.kind == QuestionKind::Loyalty && question.truth && !answer {
            events.push(SessionEvent::LoyaltyBreach {
                question: self.index,
            });
        }

        self.strikes += 1;
        events.push(SessionEvent::PursuerAdvanced {
            step: self.strikes,
            of: self.config.strike_cap,
        });

        if self.strikes >= self.config.strike_cap {
            debug!(session = %self.id, index = self.index, "interrogation lost");
            self.phase = InterrogationPhase::Lost;
            events.push(SessionEvent::Lost {
                reason: LossReason::StrikesExhausted,
            });
        }
        events
    }

    fn win(&mut self) -> Vec<SessionEvent> {
        debug!(session = %self.id, strikes = self.strikes, "interrogation survived");
        self.phase = InterrogationPhase::Won;
        let mut events = vec![SessionEvent::Won];
        events.extend(award(
            &self.ledger,
            self.config.fragment,
            Some(ProgressFlag::InterrogationPassed),
        ));
        events
    }
}

/// Ranked samples easiest first, then the loyalty block.
fn assemble(
    config: &InterrogationConfig,
    bank: &InterrogationBank,
    rng: &mut StdRng,
) -> Vec<Question> {
    let ranked = [
        (Difficulty::Easy, &bank.easy, config.easy_count),
        (Difficulty::Medium, &bank.medium, config.medium_count),
        (Difficulty::Hard, &bank.hard, config.hard_count),
    ];

    let mut questions = Vec::new();
    for (difficulty, pool, count) in ranked {
        questions.extend(sample(pool, count, rng).into_iter().map(|s| Question {
            text: s.text,
            truth: s.truth,
            kind: QuestionKind::Ranked(difficulty),
        }));
    }
    questions.extend(bank.loyalty.iter().map(|s| Question {
        text: s.text.clone(),
        truth: s.truth,
        kind: QuestionKind::Loyalty,
    }));
    questions
}

impl Session for InterrogationSession {
    type Command = InterrogationCommand;
    type Phase = InterrogationPhase;

    fn id(&self) -> SessionId {
        self.id
    }

    fn phase(&self) -> InterrogationPhase {
        self.phase
    }

    fn is_finished(&self) -> bool {
        self.phase != InterrogationPhase::Asking
    }

    fn apply(&mut self, input: Input<InterrogationCommand>) -> Vec<SessionEvent> {
        if self.is_finished() {
            return Vec::new();
        }
        match input {
            Input::Command(InterrogationCommand::Answer(answer)) => self.answer(answer),
            Input::Tick { .. } => Vec::new(),
        }
    }

    fn restart(&mut self) {
        self.id = SessionId::new();
        self.questions = assemble(&self.config, &self.bank, &mut self.rng);
        self.index = 0;
        self.strikes = 0;
        self.phase = InterrogationPhase::Asking;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lore_ledger::{MemoryStore, ProgressionLedger};
    use rand::SeedableRng;

    fn session(seed: u64) -> (InterrogationSession, SharedLedger) {
        let ledger = ProgressionLedger::shared(MemoryStore::new());
        let session = InterrogationSession::new(
            InterrogationConfig::default(),
            InterrogationBank::builtin().unwrap(),
            ledger.clone(),
            StdRng::seed_from_u64(seed),
        )
        .unwrap();
        (session, ledger)
    }

    fn answer_right(session: &mut InterrogationSession) -> Vec<SessionEvent> {
        let truth = session.current_question().unwrap().truth;
        session.command(InterrogationCommand::Answer(truth))
    }

    fn answer_wrong(session: &mut InterrogationSession) -> Vec<SessionEvent> {
        let truth = session.current_question().unwrap().truth;
        session.command(InterrogationCommand::Answer(!truth))
    }

    #[test]
    fn test_question_list_shape() {
        let (session, _) = session(1);
        let bank = InterrogationBank::builtin().unwrap();
        let questions = session.questions();

        assert_eq!(questions.len(), 3 + 3 + 2 + bank.loyalty.len());
        assert!(questions[..3]
            .iter()
            .all(|q| q.kind == QuestionKind::Ranked(Difficulty::Easy)));
        assert!(questions[6..8]
            .iter()
            .all(|q| q.kind == QuestionKind::Ranked(Difficulty::Hard)));

        let tail: Vec<&str> = questions[8..].iter().map(|q| q.text.as_str()).collect();
        let loyalty: Vec<&str> = bank.loyalty.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(tail, loyalty);
    }

    #[test]
    fn test_three_wrong_answers_lose() {
        for seed in 0..5 {
            let (mut session, ledger) = session(seed);
            answer_wrong(&mut session);
            answer_right(&mut session);
            answer_right(&mut session);
            answer_wrong(&mut session);
            let events = answer_wrong(&mut session);

            assert_eq!(session.phase(), InterrogationPhase::Lost);
            assert!(events.contains(&SessionEvent::Lost {
                reason: LossReason::StrikesExhausted
            }));
            assert_eq!(ledger.borrow().progress().unlocked, 0);
        }
    }

    #[test]
    fn test_two_wrong_then_finish_wins() {
        let (mut session, ledger) = session(7);
        answer_wrong(&mut session);
        answer_wrong(&mut session);

        let mut events = Vec::new();
        while session.current_question().is_some() {
            events = answer_right(&mut session);
        }

        assert_eq!(session.phase(), InterrogationPhase::Won);
        assert_eq!(session.strikes(), 2);
        assert!(events.contains(&SessionEvent::FirstCompletion {
            flag: ProgressFlag::InterrogationPassed
        }));
        assert!(ledger.borrow().is_flag_set(ProgressFlag::InterrogationPassed));
    }

    #[test]
    fn test_wrong_answer_does_not_advance() {
        let (mut session, _) = session(3);
        let events = answer_wrong(&mut session);

        assert_eq!(session.question_index(), 0);
        assert_eq!(events, vec![SessionEvent::PursuerAdvanced { step: 1, of: 3 }]);
    }

    #[test]
    fn test_denying_true_loyalty_statement_breaches() {
        let (mut session, _) = session(4);
        for _ in 0..8 {
            answer_right(&mut session);
        }
        let question = session.current_question().unwrap().clone();
        assert_eq!(question.kind, QuestionKind::Loyalty);
        assert!(question.truth);

        let events = session.command(InterrogationCommand::Answer(false));
        assert_eq!(events[0], SessionEvent::LoyaltyBreach { question: 8 });
        assert_eq!(session.strikes(), 1);
    }

    #[test]
    fn test_affirming_false_loyalty_statement_is_plain_strike() {
        let (mut session, _) = session(4);
        while session
            .current_question()
            .is_some_and(|q| q.kind != QuestionKind::Loyalty || q.truth)
        {
            answer_right(&mut session);
        }

        let events = session.command(InterrogationCommand::Answer(true));
        assert!(!events
            .iter()
            .any(|e| matches!(e, SessionEvent::LoyaltyBreach { .. })));
        assert_eq!(session.strikes(), 1);
    }

    #[test]
    fn test_repeat_completion_is_not_first() {
        let (mut session, ledger) = session(9);
        while session.current_question().is_some() {
            answer_right(&mut session);
        }
        session.restart();

        let mut events = Vec::new();
        while session.current_question().is_some() {
            events = answer_right(&mut session);
        }

        assert!(events.contains(&SessionEvent::FragmentUnlocked {
            fragment: InterrogationConfig::default().fragment,
            was_new: false,
        }));
        assert!(!events
            .iter()
            .any(|e| matches!(e, SessionEvent::FirstCompletion { .. })));
        assert_eq!(ledger.borrow().progress().unlocked, 1);
    }

    #[test]
    fn test_small_pool_rejected() {
        let mut bank = InterrogationBank::builtin().unwrap();
        bank.hard.truncate(1);
        let result = InterrogationSession::new(
            InterrogationConfig::default(),
            bank,
            ProgressionLedger::shared(MemoryStore::new()),
            StdRng::seed_from_u64(0),
        );
        assert!(matches!(
            result,
            Err(ContentError::PoolTooSmall { pool: "hard", needed: 2, available: 1 })
        ));
    }
}
