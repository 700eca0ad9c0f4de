//! ASCII grid layouts.
//!
//! `#` wall, `.` floor, `S` player start, `E` exit, `P` participant.
//! Every non-wall marker is also floor.

use serde::{Deserialize, Serialize};

use super::Position;
use crate::error::ContentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Wall,
    Floor,
}

/// A parsed grid with its markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    pub start: Position,
    pub exit: Option<Position>,
    pub participants: Vec<Position>,
}

impl GridLayout {
    /// Parse a rectangular layout from ASCII rows.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, ContentError> {
        let cols = rows
            .first()
            .map(|r| r.as_ref().chars().count())
            .ok_or_else(|| ContentError::Layout("layout has no rows".into()))?;

        let mut cells = Vec::with_capacity(rows.len() * cols);
        let mut start = None;
        let mut exit = None;
        let mut participants = Vec::new();

        for (r, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            if line.chars().count() != cols {
                return Err(ContentError::Layout(format!(
                    "row {r} has {} columns, expected {cols}",
                    line.chars().count()
                )));
            }
            for (c, ch) in line.chars().enumerate() {
                let here = Position::new(r as i32, c as i32);
                let cell = match ch {
                    '#' => Cell::Wall,
                    '.' => Cell::Floor,
                    'S' => {
                        if start.replace(here).is_some() {
                            return Err(ContentError::Layout("more than one start".into()));
                        }
                        Cell::Floor
                    }
                    'E' => {
                        if exit.replace(here).is_some() {
                            return Err(ContentError::Layout("more than one exit".into()));
                        }
                        Cell::Floor
                    }
                    'P' => {
                        participants.push(here);
                        Cell::Floor
                    }
                    other => {
                        return Err(ContentError::Layout(format!(
                            "unknown cell '{other}' at {here}"
                        )))
                    }
                };
                cells.push(cell);
            }
        }

        let start = start.ok_or_else(|| ContentError::Layout("layout has no start".into()))?;
        Ok(Self {
            rows: rows.len(),
            cols,
            cells,
            start,
            exit,
            participants,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether `pos` lies inside the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row >= 0
            && pos.col >= 0
            && (pos.row as usize) < self.rows
            && (pos.col as usize) < self.cols
    }

    /// The cell at `pos`; out-of-bounds reads as wall.
    pub fn cell(&self, pos: Position) -> Cell {
        if !self.in_bounds(pos) {
            return Cell::Wall;
        }
        self.cells[pos.row as usize * self.cols + pos.col as usize]
    }

    pub fn is_walkable(&self, pos: Position) -> bool {
        self.cell(pos) == Cell::Floor
    }

    /// Every cell coordinate, row by row.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows)
            .flat_map(move |r| (0..self.cols).map(move |c| Position::new(r as i32, c as i32)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_markers() {
        let layout = GridLayout::parse(&["#####", "#S.P#", "#.#E#", "#####"]).unwrap();

        assert_eq!(layout.rows(), 4);
        assert_eq!(layout.cols(), 5);
        assert_eq!(layout.start, Position::new(1, 1));
        assert_eq!(layout.exit, Some(Position::new(2, 3)));
        assert_eq!(layout.participants, vec![Position::new(1, 3)]);
        assert!(layout.is_walkable(Position::new(1, 3)));
        assert!(!layout.is_walkable(Position::new(2, 2)));
    }

    #[test]
    fn test_out_of_bounds_is_wall() {
        let layout = GridLayout::parse(&["S."]).unwrap();
        assert_eq!(layout.cell(Position::new(-1, 0)), Cell::Wall);
        assert_eq!(layout.cell(Position::new(0, 2)), Cell::Wall);
    }

    #[test]
    fn test_parse_errors() {
        assert!(GridLayout::parse::<&str>(&[]).is_err());
        assert!(GridLayout::parse(&["...", "..."]).is_err());
        assert!(GridLayout::parse(&["S..", ".."]).is_err());
        assert!(GridLayout::parse(&["S.S"]).is_err());
        assert!(GridLayout::parse(&["S.x"]).is_err());
    }
}
