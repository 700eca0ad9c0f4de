//! # Lore Ledger
//!
//! The durable record of player progress across every puzzle on the site.
//! This crate is the single source of truth for unlocked fragments, one-way
//! progress flags and the last allegiance result. It contains no game logic.

pub mod error;
pub mod ledger;
pub mod progress;
pub mod storage;

pub use error::*;
pub use ledger::*;
pub use progress::*;
pub use storage::*;
