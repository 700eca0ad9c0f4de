//! # Lore Puzzles
//!
//! Session engines for the site's mini-games. Each engine is a small
//! finite-state machine that consumes player commands and timer ticks and,
//! when won, issues one unlock command to the shared
//! [`ProgressionLedger`](lore_ledger::ProgressionLedger).
//!
//! ## Engines
//!
//! - **cipher**: decode a shifted sentence word by word against the clock
//! - **grid**: maze escape and stealth swap on a fog-of-war grid with patrols
//! - **interrogation**: true or false statements with a strike cap
//! - **deduction**: identify figures from progressively revealed clues
//! - **placement**: sort landmarks into their regions
//! - **allegiance**: a tallied quiz resolved with fixed tie-break rules
//!
//! Engines never depend on each other. The ledger handle is injected at
//! construction and is the only shared state.

pub mod allegiance;
pub mod cipher;
pub mod config;
pub mod deduction;
pub mod error;
pub mod events;
pub mod grid;
pub mod interrogation;
pub mod placement;
pub mod sampling;
pub mod session;

pub use allegiance::*;
pub use cipher::*;
pub use config::*;
pub use deduction::*;
pub use error::*;
pub use events::*;
pub use grid::*;
pub use interrogation::*;
pub use placement::*;
pub use sampling::*;
pub use session::*;
