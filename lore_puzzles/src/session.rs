//! The reducer contract shared by every puzzle session.
//!
//! A session is driven by two event sources - player commands and timer
//! ticks - which both funnel into one synchronous [`Session::apply`] call.
//! Tests feed ticks directly instead of waiting on a real clock.

use lore_ledger::{FragmentId, ProgressFlag, SharedLedger};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::SessionEvent;

/// Unique identifier of one session run; regenerated on restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One input to a session reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input<C> {
    /// A discrete player action.
    Command(C),
    /// A timer tick; `elapsed_ms` is the time since the previous tick.
    Tick { elapsed_ms: u64 },
}

/// A puzzle session: a finite-state machine driven by [`Input`]s.
pub trait Session {
    type Command;
    type Phase: Copy + PartialEq + std::fmt::Debug;

    fn id(&self) -> SessionId;

    fn phase(&self) -> Self::Phase;

    /// Whether the session reached a terminal phase.
    fn is_finished(&self) -> bool;

    /// Apply one input and return what happened.
    ///
    /// Inputs that are invalid in the current phase change nothing and
    /// return no events.
    fn apply(&mut self, input: Input<Self::Command>) -> Vec<SessionEvent>;

    /// Discard all progress and start over. Never touches the ledger.
    fn restart(&mut self);

    fn command(&mut self, command: Self::Command) -> Vec<SessionEvent> {
        self.apply(Input::Command(command))
    }

    fn tick(&mut self, elapsed_ms: u64) -> Vec<SessionEvent> {
        self.apply(Input::Tick { elapsed_ms })
    }
}

/// Issue the unlock command for a won session and raise its one-way flag.
pub(crate) fn award(
    ledger: &SharedLedger,
    fragment: FragmentId,
    flag: Option<ProgressFlag>,
) -> Vec<SessionEvent> {
    let mut ledger = ledger.borrow_mut();
    let outcome = ledger.unlock_fragment(fragment);
    let mut events = vec![SessionEvent::FragmentUnlocked {
        fragment: outcome.fragment,
        was_new: outcome.was_new,
    }];

    if let Some(flag) = flag {
        if ledger.set_flag(flag) {
            events.push(SessionEvent::FirstCompletion { flag });
        }
    }
    events
}
