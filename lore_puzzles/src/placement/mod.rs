//! Placement: put each landmark in the region it belongs to.

use lore_ledger::{ProgressFlag, SharedLedger};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PlacementConfig;
use crate::error::ContentError;
use crate::events::{LossReason, SessionEvent};
use crate::sampling::{sample_constrained, Tagged, Tally};
use crate::session::{award, Input, Session, SessionId};

const BUILTIN_POOL: &str = include_str!("../data/placement.json");

/// The five regions of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Highlands,
    Marshes,
    Coast,
    Capital,
    Wastes,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::Highlands,
        Region::Marshes,
        Region::Coast,
        Region::Capital,
        Region::Wastes,
    ];
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Region::Highlands => "highlands",
            Region::Marshes => "marshes",
            Region::Coast => "coast",
            Region::Capital => "capital",
            Region::Wastes => "wastes",
        };
        f.write_str(name)
    }
}

/// A landmark tagged with its correct region.
pub type Landmark = Tagged<String, Region>;

#[derive(Deserialize)]
struct LandmarkEntry {
    name: String,
    region: Region,
}

/// Parse a landmark pool from `[{ "name": ..., "region": ... }]`.
pub fn landmarks_from_json(raw: &str) -> Result<Vec<Landmark>, ContentError> {
    let entries: Vec<LandmarkEntry> = serde_json::from_str(raw)?;
    Ok(entries
        .into_iter()
        .map(|entry| Tagged::new(entry.name, entry.region))
        .collect())
}

/// The landmark pool shipped with the crate.
pub fn builtin_landmarks() -> Result<Vec<Landmark>, ContentError> {
    landmarks_from_json(BUILTIN_POOL)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementPhase {
    Placing,
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementCommand {
    PlaceIn(Region),
}

pub struct PlacementSession {
    id: SessionId,
    config: PlacementConfig,
    pool: Vec<Landmark>,
    ledger: SharedLedger,
    rng: StdRng,
    rounds: Vec<Landmark>,
    round_index: usize,
    lives: u32,
    phase: PlacementPhase,
}

impl PlacementSession {
    pub fn new(
        config: PlacementConfig,
        pool: Vec<Landmark>,
        ledger: SharedLedger,
        mut rng: StdRng,
    ) -> Result<Self, ContentError> {
        let needed = config.rounds.max(1);
        if pool.len() < needed {
            return Err(ContentError::PoolTooSmall {
                pool: "landmarks",
                needed,
                available: pool.len(),
            });
        }

        let rounds = select_rounds(&config, &pool, &mut rng);
        let lives = config.lives;
        Ok(Self {
            id: SessionId::new(),
            config,
            pool,
            ledger,
            rng,
            rounds,
            round_index: 0,
            lives,
            phase: PlacementPhase::Placing,
        })
    }

    /// Zero-based index of the landmark being placed.
    pub fn round_index(&self) -> usize {
        self.round_index
    }

    /// Lives left before the session is lost.
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// The landmark awaiting placement, if the session is still running.
    pub fn current(&self) -> Option<&str> {
        match self.phase {
            PlacementPhase::Placing => self.rounds.get(self.round_index).map(|l| l.item.as_str()),
            _ => None,
        }
    }

    /// Landmarks chosen for this session, in round order.
    pub fn rounds(&self) -> &[Landmark] {
        &self.rounds
    }

    /// How many of this session's landmarks fall in each region.
    pub fn region_spread(&self) -> Tally<Region> {
        self.rounds.iter().map(|l| l.tag).collect()
    }

    fn place(&mut self, chosen: Region) -> Vec<SessionEvent> {
        let Some(landmark) = self.rounds.get(self.round_index) else {
            return Vec::new();
        };

        if landmark.tag != chosen {
            self.lives = self.lives.saturating_sub(1);
            let mut events = vec![
                SessionEvent::Misplaced {
                    entity: landmark.item.clone(),
                    chosen,
                    correct: landmark.tag,
                },
                SessionEvent::LifeLost {
                    remaining: self.lives,
                },
            ];
            if self.lives == 0 {
                debug!(session = %self.id, round = self.round_index, "placement lost");
                self.phase = PlacementPhase::Lost;
                events.push(SessionEvent::Lost {
                    reason: LossReason::LivesExhausted,
                });
            }
            return events;
        }

        self.round_index += 1;
        if self.round_index < self.rounds.len() {
            return vec![SessionEvent::RoundStarted {
                round: self.round_index,
            }];
        }

        debug!(session = %self.id, lives = self.lives, "placement complete");
        self.phase = PlacementPhase::Won;
        let mut events = vec![SessionEvent::Won];
        events.extend(award(
            &self.ledger,
            self.config.fragment,
            Some(ProgressFlag::PlacementPassed),
        ));
        events
    }
}

/// Whether a draw covers enough regions, anchors included.
fn is_diverse(config: &PlacementConfig, picked: &[Landmark]) -> bool {
    let spread: Tally<Region> = picked.iter().map(|l| l.tag).collect();
    spread.distinct() >= config.min_distinct_regions
        && config.anchors.iter().all(|&anchor| spread.get(anchor) > 0)
}

fn select_rounds(config: &PlacementConfig, pool: &[Landmark], rng: &mut StdRng) -> Vec<Landmark> {
    sample_constrained(pool, config.rounds.max(1), rng, config.sample_attempts, |picked| {
        is_diverse(config, picked)
    })
    .items
}

impl Session for PlacementSession {
    type Command = PlacementCommand;
    type Phase = PlacementPhase;

    fn id(&self) -> SessionId {
        self.id
    }

    fn phase(&self) -> PlacementPhase {
        self.phase
    }

    fn is_finished(&self) -> bool {
        self.phase != PlacementPhase::Placing
    }

    fn apply(&mut self, input: Input<PlacementCommand>) -> Vec<SessionEvent> {
        if self.is_finished() {
            return Vec::new();
        }
        match input {
            Input::Command(PlacementCommand::PlaceIn(region)) => self.place(region),
            Input::Tick { .. } => Vec::new(),
        }
    }

    fn restart(&mut self) {
        self.id = SessionId::new();
        self.rounds = select_rounds(&self.config, &self.pool, &mut self.rng);
        self.round_index = 0;
        self.lives = self.config.lives;
        self.phase = PlacementPhase::Placing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lore_ledger::{MemoryStore, ProgressionLedger};
    use rand::SeedableRng;

    fn session_with(config: PlacementConfig, seed: u64) -> (PlacementSession, SharedLedger) {
        let ledger = ProgressionLedger::shared(MemoryStore::new());
        let session = PlacementSession::new(
            config,
            builtin_landmarks().unwrap(),
            ledger.clone(),
            StdRng::seed_from_u64(seed),
        )
        .unwrap();
        (session, ledger)
    }

    fn session(seed: u64) -> (PlacementSession, SharedLedger) {
        session_with(PlacementConfig::default(), seed)
    }

    fn correct(session: &PlacementSession) -> Region {
        session.rounds()[session.round_index()].tag
    }

    fn wrong(session: &PlacementSession) -> Region {
        let right = correct(session);
        Region::ALL.into_iter().find(|&r| r != right).unwrap()
    }

    #[test]
    fn test_builtin_pool_covers_every_region() {
        let pool = builtin_landmarks().unwrap();
        let spread: Tally<Region> = pool.iter().map(|l| l.tag).collect();
        assert_eq!(spread.distinct(), Region::ALL.len());
    }

    #[test]
    fn test_selection_is_diverse_with_anchors() {
        for seed in 0..20 {
            let (session, _) = session(seed);
            let spread = session.region_spread();
            assert_eq!(session.rounds().len(), 8);
            assert!(spread.distinct() >= 3);
            assert!(spread.get(Region::Highlands) > 0);
            assert!(spread.get(Region::Coast) > 0);
        }
    }

    #[test]
    fn test_unmeetable_constraint_falls_back() {
        let config = PlacementConfig {
            min_distinct_regions: 6,
            sample_attempts: 4,
            ..PlacementConfig::default()
        };
        let (session, _) = session_with(config.clone(), 1);
        assert_eq!(session.rounds().len(), 8);
        assert!(!is_diverse(&config, session.rounds()));
        assert_eq!(session.phase(), PlacementPhase::Placing);
    }

    #[test]
    fn test_correct_placement_advances() {
        let (mut session, _) = session(2);
        let region = correct(&session);
        let events = session.command(PlacementCommand::PlaceIn(region));
        assert_eq!(events, vec![SessionEvent::RoundStarted { round: 1 }]);
        assert_eq!(session.lives(), 3);
    }

    #[test]
    fn test_misplacement_costs_life_and_stays() {
        let (mut session, _) = session(3);
        let entity = session.current().unwrap().to_string();
        let chosen = wrong(&session);
        let events = session.command(PlacementCommand::PlaceIn(chosen));

        assert_eq!(
            events,
            vec![
                SessionEvent::Misplaced {
                    entity: entity.clone(),
                    chosen,
                    correct: correct(&session),
                },
                SessionEvent::LifeLost { remaining: 2 },
            ]
        );
        assert_eq!(session.round_index(), 0);
        assert_eq!(session.current(), Some(entity.as_str()));
    }

    #[test]
    fn test_three_misplacements_lose() {
        let (mut session, ledger) = session(4);
        for _ in 0..3 {
            let chosen = wrong(&session);
            session.command(PlacementCommand::PlaceIn(chosen));
        }
        assert_eq!(session.phase(), PlacementPhase::Lost);
        assert_eq!(session.current(), None);
        assert!(session.command(PlacementCommand::PlaceIn(Region::Coast)).is_empty());
        assert!(!ledger.borrow().is_flag_set(ProgressFlag::PlacementPassed));
    }

    #[test]
    fn test_full_run_wins() {
        let (mut session, ledger) = session(5);
        let mut events = Vec::new();
        for _ in 0..8 {
            let region = correct(&session);
            events = session.command(PlacementCommand::PlaceIn(region));
        }
        assert_eq!(session.phase(), PlacementPhase::Won);
        assert_eq!(events[0], SessionEvent::Won);
        assert!(ledger.borrow().is_flag_set(ProgressFlag::PlacementPassed));
    }

    #[test]
    fn test_restart_restores_lives() {
        let (mut session, _) = session(6);
        let chosen = wrong(&session);
        session.command(PlacementCommand::PlaceIn(chosen));
        session.restart();
        assert_eq!(session.lives(), 3);
        assert_eq!(session.round_index(), 0);
    }

    #[test]
    fn test_region_display_matches_serde() {
        for region in Region::ALL {
            let json = serde_json::to_string(&region).unwrap();
            assert_eq!(json, format!("\"{region}\""));
        }
    }
}
