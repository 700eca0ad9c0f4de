//! Grid evasion - the shared simulation behind the maze and swap games.
//!
//! Both games put the player on a walled grid under fog of war while
//! scripted agents patrol fixed routes. All proximity checks use the
//! Chebyshev (king-move) metric so diagonal neighbours count as contact.

mod agent;
mod builtin;
mod layout;
mod maze;
mod stealth;
mod world;

pub use agent::*;
pub use builtin::*;
pub use layout::*;
pub use maze::*;
pub use stealth::*;
pub use world::*;

use serde::{Deserialize, Serialize};

/// A cell coordinate on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// King-move distance: `max(|drow|, |dcol|)`.
    pub fn chebyshev(self, other: Position) -> u32 {
        let dr = (self.row - other.row).unsigned_abs();
        let dc = (self.col - other.col).unsigned_abs();
        dr.max(dc)
    }

    /// The neighbouring cell in `direction`.
    pub fn step(self, direction: Direction) -> Position {
        let (dr, dc) = direction.delta();
        Position::new(self.row + dr, self.col + dc)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Player movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

/// Phases shared by both grid games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridPhase {
    Exploring,
    Confronted,
    Won,
    Lost,
}

impl GridPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, GridPhase::Won | GridPhase::Lost)
    }
}
