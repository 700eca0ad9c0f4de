//! Stealth swap: slip between patrols and swap out marked participants.
//!
//! Swapping a participant while any patrol stands within one cell of it is
//! an automatic failure. Three failures lose the game.

use lore_ledger::{ProgressFlag, SharedLedger};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Direction, GridPhase, GridScenario, GridWorld, Position};
use crate::config::StealthConfig;
use crate::error::ContentError;
use crate::events::{LossReason, SessionEvent};
use crate::session::{award, Input, Session, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantState {
    Pending,
    Resolved,
}

/// A static cell the player can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub position: Position,
    pub state: ParticipantState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapCommand {
    Move(Direction),
    /// Swap the participant with this index; must be within reach.
    Swap { participant: usize },
}

pub struct SwapSession {
    id: SessionId,
    config: StealthConfig,
    ledger: SharedLedger,
    world: GridWorld,
    participants: Vec<Participant>,
    phase: GridPhase,
    failures: u32,
}

impl SwapSession {
    pub fn new(
        config: StealthConfig,
        scenario: GridScenario,
        ledger: SharedLedger,
    ) -> Result<Self, ContentError> {
        if scenario.layout.participants.len() < config.required_resolved {
            return Err(ContentError::PoolTooSmall {
                pool: "participants",
                needed: config.required_resolved,
                available: scenario.layout.participants.len(),
            });
        }

        let participants = pending(&scenario.layout.participants);
        let world = GridWorld::new(scenario.layout, &scenario.agents, config.visibility_radius)?;
        Ok(Self {
            id: SessionId::new(),
            config,
            ledger,
            world,
            participants,
            phase: GridPhase::Exploring,
            failures: 0,
        })
    }

    /// The grid, player and agents.
    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    /// Where the player stands.
    pub fn player(&self) -> Position {
        self.world.player()
    }

    /// Swap targets and whether each is resolved.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Failed swaps so far.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Participants already swapped.
    pub fn resolved_count(&self) -> usize {
        self.participants
            .iter()
            .filter(|p| p.state == ParticipantState::Resolved)
            .count()
    }

    /// Whether `pos` is lit. Winning reveals the whole grid.
    pub fn is_visible(&self, pos: Position) -> bool {
        self.world.is_visible(pos, self.phase == GridPhase::Won)
    }

    fn on_swap(&mut self, index: usize) -> Vec<SessionEvent> {
        let Some(target) = self.participants.get(index).copied() else {
            return Vec::new();
        };
        if target.state == ParticipantState::Resolved
            || target.position.chebyshev(self.world.player()) > 1
        {
            return Vec::new();
        }

        if let Some(agent) = self.world.nearest_agent_within(target.position, 1) {
            return self.caught(agent, target.position);
        }

        self.participants[index].state = ParticipantState::Resolved;
        let mut events = vec![SessionEvent::ParticipantResolved { participant: index }];

        if self.resolved_count() >= self.config.required_resolved {
            debug!(session = %self.id, failures = self.failures, "swap complete");
            self.phase = GridPhase::Won;
            events.push(SessionEvent::Won);
            events.extend(award(
                &self.ledger,
                self.config.fragment,
                Some(ProgressFlag::SwapPassed),
            ));
        }
        events
    }

    /// A risky swap was spotted: confront, then classify as a failure.
    fn caught(&mut self, agent: usize, at: Position) -> Vec<SessionEvent> {
        self.phase = GridPhase::Confronted;
        self.failures += 1;
        debug!(session = %self.id, agent, failures = self.failures, "swap spotted");

        let mut events = vec![
            SessionEvent::Confronted { agent, at },
            SessionEvent::ConfrontationFailed {
                failures: self.failures,
            },
        ];
        self.world.reset_agents();

        if self.failures >= self.config.failure_threshold {
            self.phase = GridPhase::Lost;
            events.push(SessionEvent::Lost {
                reason: LossReason::Caught,
            });
        } else {
            self.phase = GridPhase::Exploring;
        }
        events
    }

    fn on_tick(&mut self, elapsed_ms: u64) -> Vec<SessionEvent> {
        self.world.step_agents();
        self.world
            .pass_time(elapsed_ms)
            .into_iter()
            .map(|agent| SessionEvent::AgentActivated { agent })
            .collect()
    }
}

fn pending(positions: &[Position]) -> Vec<Participant> {
    positions
        .iter()
        .map(|&position| Participant {
            position,
            state: ParticipantState::Pending,
        })
        .collect()
}

impl Session for SwapSession {
    type Command = SwapCommand;
    type Phase = GridPhase;

    fn id(&self) -> SessionId {
        self.id
    }

    fn phase(&self) -> GridPhase {
        self.phase
    }

    fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    fn apply(&mut self, input: Input<SwapCommand>) -> Vec<SessionEvent> {
        if self.is_finished() {
            return Vec::new();
        }
        match input {
            Input::Command(SwapCommand::Move(direction)) => {
                self.world.try_move(direction);
                Vec::new()
            }
            Input::Command(SwapCommand::Swap { participant }) => self.on_swap(participant),
            Input::Tick { elapsed_ms } => self.on_tick(elapsed_ms),
        }
    }

    fn restart(&mut self) {
        self.id = SessionId::new();
        self.world.reset();
        self.participants = pending(&self.world.layout().participants);
        self.phase = GridPhase::Exploring;
        self.failures = 0;
    }
}
