//! Scripted patrol agents.

use serde::{Deserialize, Serialize};

use super::Position;

/// Static description of an agent in a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub route: Vec<Position>,
    /// Route cells advanced per tick; fractional speeds linger on a cell.
    pub speed_per_tick: f32,
    /// Dormant until this much session time has passed; `None` starts active.
    #[serde(default)]
    pub activate_after_ms: Option<u64>,
}

/// An agent walking a cyclic route.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    route: Vec<Position>,
    cursor: f32,
    speed_per_tick: f32,
}

impl Agent {
    pub fn new(route: Vec<Position>, speed_per_tick: f32) -> Option<Self> {
        if route.is_empty() {
            return None;
        }
        Some(Self {
            route,
            cursor: 0.0,
            speed_per_tick,
        })
    }

    /// Current cell: the route element at `floor(cursor)`.
    pub fn position(&self) -> Position {
        let index = (self.cursor.floor() as usize).min(self.route.len() - 1);
        self.route[index]
    }

    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    /// Move one tick along the route, wrapping at the end.
    pub fn advance(&mut self) {
        self.cursor = (self.cursor + self.speed_per_tick) % self.route.len() as f32;
    }

    /// Put the agent back on the first route cell.
    pub fn reset(&mut self) {
        self.cursor = 0.0;
    }
}

/// Build a route that walks `cells` forward and back again without
/// repeating the end points.
pub fn ping_pong(cells: &[Position]) -> Vec<Position> {
    let mut route = cells.to_vec();
    if cells.len() > 2 {
        route.extend(cells[1..cells.len() - 1].iter().rev());
    }
    route
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: i32) -> Vec<Position> {
        (0..n).map(|c| Position::new(0, c)).collect()
    }

    #[test]
    fn test_advance_wraps() {
        let mut agent = Agent::new(line(3), 1.0).unwrap();
        let mut seen = Vec::new();
        for _ in 0..4 {
            agent.advance();
            seen.push(agent.position().col);
        }
        assert_eq!(seen, vec![1, 2, 0, 1]);
    }

    #[test]
    fn test_fractional_speed_lingers() {
        let mut agent = Agent::new(line(4), 0.5).unwrap();
        agent.advance();
        assert_eq!(agent.position().col, 0);
        agent.advance();
        assert_eq!(agent.position().col, 1);
    }

    #[test]
    fn test_reset() {
        let mut agent = Agent::new(line(4), 1.0).unwrap();
        agent.advance();
        agent.advance();
        agent.reset();
        assert_eq!(agent.position(), Position::new(0, 0));
        assert_eq!(agent.cursor(), 0.0);
    }

    #[test]
    fn test_empty_route_rejected() {
        assert!(Agent::new(Vec::new(), 1.0).is_none());
    }

    #[test]
    fn test_ping_pong() {
        let cols: Vec<i32> = ping_pong(&line(4)).iter().map(|p| p.col).collect();
        assert_eq!(cols, vec![0, 1, 2, 3, 2, 1]);
        assert_eq!(ping_pong(&line(2)).len(), 2);
    }
}
