//! Maze escape: reach the exit while patrols hunt the corridors.
//!
//! Walking into a patrol (or being walked into) starts a confrontation: a
//! rapid-press race against a short window. Losing the race twice loses
//! the maze.

use lore_ledger::{ProgressFlag, SharedLedger};
use tracing::debug;

use super::{Direction, GridPhase, GridScenario, GridWorld, Position};
use crate::config::MazeConfig;
use crate::error::ContentError;
use crate::events::{LossReason, SessionEvent};
use crate::session::{award, Input, Session, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MazeCommand {
    Move(Direction),
    /// One press in the confrontation race.
    Press,
}

/// Progress of the current confrontation race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confrontation {
    pub agent: usize,
    pub presses: u32,
    pub remaining_ms: u64,
}

pub struct MazeSession {
    id: SessionId,
    config: MazeConfig,
    ledger: SharedLedger,
    world: GridWorld,
    exit: Position,
    phase: GridPhase,
    confrontation: Option<Confrontation>,
    failures: u32,
    /// Whether an agent shared the player's cell after the last update.
    in_contact: bool,
}

impl MazeSession {
    pub fn new(
        config: MazeConfig,
        scenario: GridScenario,
        ledger: SharedLedger,
    ) -> Result<Self, ContentError> {
        let exit = scenario
            .layout
            .exit
            .ok_or_else(|| ContentError::Layout("maze layout has no exit".into()))?;
        let world = GridWorld::new(scenario.layout, &scenario.agents, config.visibility_radius)?;

        let mut session = Self {
            id: SessionId::new(),
            config,
            ledger,
            world,
            exit,
            phase: GridPhase::Exploring,
            confrontation: None,
            failures: 0,
            in_contact: false,
        };
        session.in_contact = session.contact().is_some();
        Ok(session)
    }

    /// The grid, player and agents.
    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    /// Where the player stands.
    pub fn player(&self) -> Position {
        self.world.player()
    }

    /// Confrontations lost so far.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// The press race in progress, if any.
    pub fn confrontation(&self) -> Option<Confrontation> {
        self.confrontation
    }

    /// Whether `pos` is lit. Winning reveals the whole maze.
    pub fn is_visible(&self, pos: Position) -> bool {
        self.world.is_visible(pos, self.phase == GridPhase::Won)
    }

    fn contact(&self) -> Option<usize> {
        self.world.nearest_agent_within(self.world.player(), 0)
    }

    /// Enter a confrontation only on the update where contact begins.
    fn check_contact(&mut self) -> Vec<SessionEvent> {
        let contact = self.contact();
        let began = contact.is_some() && !self.in_contact;
        self.in_contact = contact.is_some();

        match contact {
            Some(agent) if began => {
                debug!(session = %self.id, agent, "maze confrontation");
                self.phase = GridPhase::Confronted;
                self.confrontation = Some(Confrontation {
                    agent,
                    presses: 0,
                    remaining_ms: self.config.press_window_ms,
                });
                vec![SessionEvent::Confronted {
                    agent,
                    at: self.world.player(),
                }]
            }
            _ => Vec::new(),
        }
    }

    fn end_confrontation(&mut self) {
        self.confrontation = None;
        self.phase = GridPhase::Exploring;
        self.world.reset_agents();
        self.in_contact = self.contact().is_some();
    }

    fn on_move(&mut self, direction: Direction) -> Vec<SessionEvent> {
        if self.phase != GridPhase::Exploring || !self.world.try_move(direction) {
            return Vec::new();
        }

        if self.world.player() == self.exit {
            debug!(session = %self.id, "maze escaped");
            self.phase = GridPhase::Won;
            let mut events = vec![SessionEvent::Won];
            events.extend(award(
                &self.ledger,
                self.config.fragment,
                Some(ProgressFlag::EvasionPassed),
            ));
            return events;
        }
        self.check_contact()
    }

    fn on_press(&mut self) -> Vec<SessionEvent> {
        let Some(race) = self.confrontation.as_mut() else {
            return Vec::new();
        };
        race.presses += 1;
        if race.presses < self.config.press_quota {
            return Vec::new();
        }
        self.end_confrontation();
        vec![SessionEvent::ConfrontationResolved]
    }

    fn on_tick(&mut self, elapsed_ms: u64) -> Vec<SessionEvent> {
        // Agents woken by this tick stay on their first route cell until the next one.
        let exploring = self.phase == GridPhase::Exploring;
        if exploring {
            self.world.step_agents();
        }
        let mut events: Vec<SessionEvent> = self
            .world
            .pass_time(elapsed_ms)
            .into_iter()
            .map(|agent| SessionEvent::AgentActivated { agent })
            .collect();

        if exploring {
            events.extend(self.check_contact());
            return events;
        }

        let Some(race) = self.confrontation.as_mut() else {
            return events;
        };
        race.remaining_ms = race.remaining_ms.saturating_sub(elapsed_ms);
        if race.remaining_ms > 0 {
            return events;
        }

        self.failures += 1;
        events.push(SessionEvent::ConfrontationFailed {
            failures: self.failures,
        });
        self.end_confrontation();

        if self.failures >= self.config.failure_threshold {
            debug!(session = %self.id, failures = self.failures, "maze lost");
            self.phase = GridPhase::Lost;
            events.push(SessionEvent::Lost {
                reason: LossReason::Caught,
            });
        }
        events
    }
}

impl Session for MazeSession {
    type Command = MazeCommand;
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

    fn apply(&mut self, input: Input<MazeCommand>) -> Vec<SessionEvent> {
        if self.is_finished() {
            return Vec::new();
        }
        match input {
            Input::Command(MazeCommand::Move(direction)) => self.on_move(direction),
            Input::Command(MazeCommand::Press) => self.on_press(),
            Input::Tick { elapsed_ms } => self.on_tick(elapsed_ms),
        }
    }

    fn restart(&mut self) {
        self.id = SessionId::new();
        self.world.reset();
        self.phase = GridPhase::Exploring;
        self.confrontation = None;
        self.failures = 0;
        self.in_contact = self.contact().is_some();
    }
}
