//! Built-in grid scenarios.

use serde::{Deserialize, Serialize};

use super::{ping_pong, AgentSpec, GridLayout, Position};
use crate::error::ContentError;

/// A layout plus the agents that patrol it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridScenario {
    pub layout: GridLayout,
    pub agents: Vec<AgentSpec>,
}

const UNDERCROFT: [&str; 11] = [
    "###########",
    "#S..#.....#",
    "#.#.#.###.#",
    "#.#...#...#",
    "#.#####.###",
    "#...#...#.#",
    "###.#.###.#",
    "#...#.....#",
    "#.#######.#",
    "#........E#",
    "###########",
];

const GALLERY: [&str; 9] = [
    "#########",
    "#S..P...#",
    "#.##.##.#",
    "#P.....P#",
    "#.##.##.#",
    "#...P...#",
    "#.#####.#",
    "#P.....P#",
    "#########",
];

fn row_span(row: i32, cols: std::ops::RangeInclusive<i32>) -> Vec<Position> {
    cols.map(|col| Position::new(row, col)).collect()
}

impl GridScenario {
    /// The undercroft maze: one warden walks the exit corridor from the
    /// start, a second wakes after 45 seconds near the eastern passage.
    pub fn undercroft() -> Result<Self, ContentError> {
        Ok(Self {
            layout: GridLayout::parse(&UNDERCROFT)?,
            agents: vec![
                AgentSpec {
                    route: ping_pong(&row_span(9, 1..=8)),
                    speed_per_tick: 0.5,
                    activate_after_ms: None,
                },
                AgentSpec {
                    route: ping_pong(&row_span(7, 5..=9)),
                    speed_per_tick: 0.34,
                    activate_after_ms: Some(45_000),
                },
            ],
        })
    }

    /// The portrait gallery used by the swap game.
    pub fn gallery() -> Result<Self, ContentError> {
        Ok(Self {
            layout: GridLayout::parse(&GALLERY)?,
            agents: vec![
                AgentSpec {
                    route: ping_pong(&row_span(3, 1..=7)),
                    speed_per_tick: 0.5,
                    activate_after_ms: None,
                },
                AgentSpec {
                    route: ping_pong(&row_span(7, 1..=7)),
                    speed_per_tick: 0.4,
                    activate_after_ms: Some(60_000),
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes_walkable(scenario: &GridScenario) -> bool {
        scenario
            .agents
            .iter()
            .flat_map(|a| a.route.iter())
            .all(|pos| scenario.layout.is_walkable(*pos))
    }

    #[test]
    fn test_undercroft_is_well_formed() {
        let scenario = GridScenario::undercroft().unwrap();
        assert_eq!(scenario.layout.start, Position::new(1, 1));
        assert_eq!(scenario.layout.exit, Some(Position::new(9, 9)));
        assert!(routes_walkable(&scenario));
    }

    #[test]
    fn test_gallery_is_well_formed() {
        let scenario = GridScenario::gallery().unwrap();
        assert_eq!(scenario.layout.participants.len(), 6);
        assert!(scenario.layout.exit.is_none());
        assert!(routes_walkable(&scenario));
    }
}
