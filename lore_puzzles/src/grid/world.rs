//! The grid simulation core shared by both evasion games.

use super::{Agent, AgentSpec, Direction, GridLayout, Position};
use crate::error::ContentError;

#[derive(Debug, Clone)]
struct AgentSlot {
    agent: Agent,
    activate_after_ms: Option<u64>,
    active: bool,
}

impl AgentSlot {
    fn dormant_at_start(&self) -> bool {
        self.activate_after_ms.is_some_and(|ms| ms > 0)
    }
}

/// Player position, patrol agents and fog of war on one grid.
#[derive(Debug, Clone)]
pub struct GridWorld {
    layout: GridLayout,
    player: Position,
    agents: Vec<AgentSlot>,
    elapsed_ms: u64,
    visibility_radius: u32,
}

impl GridWorld {
    pub fn new(
        layout: GridLayout,
        specs: &[AgentSpec],
        visibility_radius: u32,
    ) -> Result<Self, ContentError> {
        let agents = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let agent = Agent::new(spec.route.clone(), spec.speed_per_tick)
                    .ok_or(ContentError::EmptyRoute { agent: index })?;
                let mut slot = AgentSlot {
                    agent,
                    activate_after_ms: spec.activate_after_ms,
                    active: true,
                };
                slot.active = !slot.dormant_at_start();
                Ok(slot)
            })
            .collect::<Result<Vec<_>, ContentError>>()?;

        Ok(Self {
            player: layout.start,
            layout,
            agents,
            elapsed_ms: 0,
            visibility_radius,
        })
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Where the player stands.
    pub fn player(&self) -> Position {
        self.player
    }

    /// Session time counted by [`pass_time`](Self::pass_time).
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Move the player one cell. Walls and edges reject the move.
    pub fn try_move(&mut self, direction: Direction) -> bool {
        let target = self.player.step(direction);
        if !self.layout.is_walkable(target) {
            return false;
        }
        self.player = target;
        true
    }

    /// Count session time and wake dormant agents whose threshold passed.
    ///
    /// Returns the indices of agents activated by this call.
    pub fn pass_time(&mut self, elapsed_ms: u64) -> Vec<usize> {
        self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms);
        let now = self.elapsed_ms;

        let mut woken = Vec::new();
        for (index, slot) in self.agents.iter_mut().enumerate() {
            if slot.active {
                continue;
            }
            if slot.activate_after_ms.is_some_and(|ms| now >= ms) {
                slot.active = true;
                slot.agent.reset();
                woken.push(index);
            }
        }
        woken
    }

    /// Advance every active agent one tick along its route.
    ///
    /// Sessions call this before [`pass_time`](Self::pass_time), so an agent
    /// woken on a tick shows on its first route cell until the next one.
    pub fn step_agents(&mut self) {
        for slot in self.agents.iter_mut().filter(|slot| slot.active) {
            slot.agent.advance();
        }
    }

    /// Send every agent back to its first route cell.
    pub fn reset_agents(&mut self) {
        for slot in &mut self.agents {
            slot.agent.reset();
        }
    }

    /// Active agents and their positions, in index order.
    pub fn active_agents(&self) -> impl Iterator<Item = (usize, Position)> + '_ {
        self.agents
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(|(index, slot)| (index, slot.agent.position()))
    }

    /// Number of agents, dormant ones included.
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn is_agent_active(&self, index: usize) -> bool {
        self.agents.get(index).is_some_and(|slot| slot.active)
    }

    /// The active agent nearest `target` within `radius`.
    ///
    /// Equal distances resolve to the lowest agent index.
    pub fn nearest_agent_within(&self, target: Position, radius: u32) -> Option<usize> {
        self.active_agents()
            .map(|(index, pos)| (pos.chebyshev(target), index))
            .filter(|(distance, _)| *distance <= radius)
            .min()
            .map(|(_, index)| index)
    }

    /// Whether `pos` is lit for the player.
    pub fn is_visible(&self, pos: Position, full_reveal: bool) -> bool {
        self.layout.in_bounds(pos)
            && (full_reveal || pos.chebyshev(self.player) <= self.visibility_radius)
    }

    /// Every lit cell, row by row.
    pub fn visible_cells(&self, full_reveal: bool) -> Vec<Position> {
        self.layout
            .positions()
            .filter(|pos| self.is_visible(*pos, full_reveal))
            .collect()
    }

    /// Back to the starting layout: player on start, dormant agents asleep.
    pub fn reset(&mut self) {
        self.player = self.layout.start;
        self.elapsed_ms = 0;
        for slot in &mut self.agents {
            slot.agent.reset();
            slot.active = !slot.dormant_at_start();
        }
    }
}
