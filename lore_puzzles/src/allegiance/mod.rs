//! Allegiance quiz: sort the player into one of the four houses.
//!
//! Every answer is tagged with a house and scores it one point. The
//! fixed final question doubles as the tie-breaker.

use lore_ledger::{Allegiance, AllegianceOutcome, SharedLedger};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AllegianceConfig;
use crate::error::ContentError;
use crate::events::SessionEvent;
use crate::sampling::{Tagged, Tally};
use crate::session::{award, Input, Session, SessionId};

const BUILTIN_BANK: &str = include_str!("../data/allegiance.json");

/// An answer option tagged with the house it favours.
pub type AllegianceAnswer = Tagged<String, Allegiance>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllegianceQuestion {
    pub prompt: String,
    pub answers: Vec<AllegianceAnswer>,
}

/// The question pool plus the question always asked last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllegianceBank {
    pub pool: Vec<AllegianceQuestion>,
    pub final_question: AllegianceQuestion,
}

#[derive(Deserialize)]
struct AnswerEntry {
    text: String,
    allegiance: Allegiance,
}

#[derive(Deserialize)]
struct QuestionEntry {
    prompt: String,
    answers: Vec<AnswerEntry>,
}

#[derive(Deserialize)]
struct BankEntry {
    pool: Vec<QuestionEntry>,
    #[serde(rename = "final")]
    final_question: QuestionEntry,
}

impl From<QuestionEntry> for AllegianceQuestion {
    fn from(entry: QuestionEntry) -> Self {
        Self {
            prompt: entry.prompt,
            answers: entry
                .answers
                .into_iter()
                .map(|a| Tagged::new(a.text, a.allegiance))
                .collect(),
        }
    }
}

impl AllegianceBank {
    pub fn from_json(raw: &str) -> Result<Self, ContentError> {
        let entry: BankEntry = serde_json::from_str(raw)?;
        Ok(Self {
            pool: entry.pool.into_iter().map(Into::into).collect(),
            final_question: entry.final_question.into(),
        })
    }

    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_json(BUILTIN_BANK)
    }
}

/// Resolve a finished tally.
///
/// A full tie is unaligned. Otherwise the sole leader wins; tied leaders
/// defer to the final answer if it is among them, then to house priority.
pub fn resolve(tally: &Tally<Allegiance>, final_answer: Allegiance) -> AllegianceOutcome {
    if tally.all_equal() {
        return AllegianceOutcome::Unaligned;
    }

    let leaders = tally.leaders();
    if leaders.contains(&final_answer) && leaders.len() > 1 {
        return final_answer.into();
    }
    leaders
        .into_iter()
        .min_by_key(|house| house.priority())
        .map_or(AllegianceOutcome::Unaligned, Into::into)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllegiancePhase {
    Answering,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllegianceCommand {
    /// Pick the answer at this position of the current question.
    Choose { answer: usize },
}

pub struct AllegianceSession {
    id: SessionId,
    config: AllegianceConfig,
    bank: AllegianceBank,
    ledger: SharedLedger,
    rng: StdRng,
    questions: Vec<AllegianceQuestion>,
    index: usize,
    tally: Tally<Allegiance>,
    outcome: Option<AllegianceOutcome>,
}

impl AllegianceSession {
    pub fn new(
        config: AllegianceConfig,
        bank: AllegianceBank,
        ledger: SharedLedger,
        mut rng: StdRng,
    ) -> Result<Self, ContentError> {
        let empty = std::iter::once(&bank.final_question)
            .chain(&bank.pool)
            .any(|q| q.answers.is_empty());
        if empty {
            return Err(ContentError::PoolTooSmall {
                pool: "allegiance answers",
                needed: 1,
                available: 0,
            });
        }

        let questions = arrange(&bank, &mut rng);
        Ok(Self {
            id: SessionId::new(),
            config,
            bank,
            ledger,
            rng,
            questions,
            index: 0,
            tally: Tally::new(Allegiance::ALL),
            outcome: None,
        })
    }

    /// Questions in the order they are asked this session.
    pub fn questions(&self) -> &[AllegianceQuestion] {
        &self.questions
    }

    /// The question awaiting an answer; `None` once resolved.
    pub fn current_question(&self) -> Option<&AllegianceQuestion> {
        self.questions.get(self.index)
    }

    /// Zero-based index of the current question.
    pub fn question_index(&self) -> usize {
        self.index
    }

    /// Points per house so far.
    pub fn tally(&self) -> &Tally<Allegiance> {
        &self.tally
    }

    /// The resolved house, set after the final answer.
    pub fn outcome(&self) -> Option<AllegianceOutcome> {
        self.outcome
    }

    fn choose(&mut self, answer: usize) -> Vec<SessionEvent> {
        let Some(house) = self
            .questions
            .get(self.index)
            .and_then(|q| q.answers.get(answer))
            .map(|a| a.tag)
        else {
            return Vec::new();
        };

        self.tally.add(house);
        self.index += 1;
        if self.index < self.questions.len() {
            return Vec::new();
        }

        let outcome = resolve(&self.tally, house);
        debug!(session = %self.id, ?outcome, "allegiance resolved");
        self.outcome = Some(outcome);

        let mut events = vec![SessionEvent::AllegianceResolved { outcome }];
        events.extend(award(&self.ledger, self.config.fragment, None));
        self.ledger.borrow_mut().record_allegiance(outcome);
        events
    }
}

/// Shuffle the pool and every answer list; the final question stays last.
fn arrange(bank: &AllegianceBank, rng: &mut StdRng) -> Vec<AllegianceQuestion> {
    let mut questions = bank.pool.clone();
    questions.shuffle(rng);
    questions.push(bank.final_question.clone());
    for question in &mut questions {
        question.answers.shuffle(rng);
    }
    questions
}

impl Session for AllegianceSession {
    type Command = AllegianceCommand;
    type Phase = AllegiancePhase;

    fn id(&self) -> SessionId {
        self.id
    }

    fn phase(&self) -> AllegiancePhase {
        if self.outcome.is_some() {
            AllegiancePhase::Resolved
        } else {
            AllegiancePhase::Answering
        }
    }

    fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    fn apply(&mut self, input: Input<AllegianceCommand>) -> Vec<SessionEvent> {
        if self.is_finished() {
            return Vec::new();
        }
        match input {
            Input::Command(AllegianceCommand::Choose { answer }) => self.choose(answer),
            Input::Tick { .. } => Vec::new(),
        }
    }

    fn restart(&mut self) {
        self.id = SessionId::new();
        self.questions = arrange(&self.bank, &mut self.rng);
        self.index = 0;
        self.tally = Tally::new(Allegiance::ALL);
        self.outcome = None;
    }
}
