//! The progression ledger - the one durable record every puzzle writes into.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::progress::{AllegianceOutcome, FragmentId, ProgressFlag, PromptRef, FRAGMENT_COUNT};
use crate::storage::{LedgerRecord, LedgerStore};

/// Handle through which every engine reaches the single ledger instance.
///
/// The host is single-threaded, so shared ownership plus interior
/// mutability is all the coordination needed.
pub type SharedLedger = Rc<RefCell<ProgressionLedger>>;

/// Result of an unlock command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockOutcome {
    pub fragment: FragmentId,
    /// `true` only the first time this fragment is unlocked.
    pub was_new: bool,
}

/// Aggregated view of collection progress, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub unlocked: usize,
    pub total: usize,
    /// Whole-number completion percentage, rounded down.
    pub percent: u8,
    pub fragments: Vec<FragmentId>,
}

/// Everything the player has unlocked, mirrored to durable storage.
pub struct ProgressionLedger {
    store: Box<dyn LedgerStore>,
    fragments: BTreeSet<FragmentId>,
    allegiance: Option<AllegianceOutcome>,
    flags: BTreeSet<ProgressFlag>,
    /// Flags written by newer versions; carried through untouched.
    foreign_flags: BTreeMap<String, bool>,
    active_prompt: Option<PromptRef>,
}

impl ProgressionLedger {
    /// Load the ledger from `store`, or start empty.
    ///
    /// A missing, unreadable or malformed record yields the empty default.
    pub fn load_or_init(store: impl LedgerStore + 'static) -> Self {
        let record = match store.load() {
            Ok(Some(raw)) => match LedgerRecord::from_json(&raw) {
                Ok(record) => record,
                Err(err) => {
                    warn!(error = %err, "discarding unreadable ledger record");
                    LedgerRecord::default()
                }
            },
            Ok(None) => {
                debug!("no ledger record found, starting fresh");
                LedgerRecord::default()
            }
            Err(err) => {
                warn!(error = %err, "ledger storage read failed, starting fresh");
                LedgerRecord::default()
            }
        };

        let mut ledger = Self {
            store: Box::new(store),
            fragments: BTreeSet::new(),
            allegiance: None,
            flags: BTreeSet::new(),
            foreign_flags: BTreeMap::new(),
            active_prompt: None,
        };
        ledger.apply_record(record);
        ledger
    }

    /// Load the ledger and wrap it in a [`SharedLedger`] handle.
    pub fn shared(store: impl LedgerStore + 'static) -> SharedLedger {
        Rc::new(RefCell::new(Self::load_or_init(store)))
    }

    fn apply_record(&mut self, record: LedgerRecord) {
        for raw in record.unlocked_fragments {
            match FragmentId::new(raw) {
                Ok(id) => {
                    self.fragments.insert(id);
                }
                Err(err) => warn!(error = %err, "skipping stored fragment"),
            }
        }

        for (name, value) in record.flags {
            match ProgressFlag::from_key(&name) {
                Some(flag) if value => {
                    self.flags.insert(flag);
                }
                Some(_) => {}
                None => {
                    self.foreign_flags.insert(name, value);
                }
            }
        }

        self.allegiance = record.allegiance_result;
        self.active_prompt = record.active_prompt;
    }

    /// Snapshot of the ledger in its storage shape.
    pub fn to_record(&self) -> LedgerRecord {
        let mut flags = self.foreign_flags.clone();
        for flag in ProgressFlag::ALL {
            flags.insert(flag.key().to_string(), self.flags.contains(&flag));
        }

        LedgerRecord {
            unlocked_fragments: self.fragments.iter().map(|id| id.get()).collect(),
            allegiance_result: self.allegiance,
            flags,
            active_prompt: self.active_prompt,
            ..LedgerRecord::default()
        }
    }

    fn persist(&mut self) {
        let raw = match self.to_record().to_json() {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "could not serialize ledger");
                return;
            }
        };
        if let Err(err) = self.store.save(&raw) {
            warn!(error = %err, "ledger write failed, keeping in-memory state");
        }
    }

    /// Unlock a fragment. Idempotent; `was_new` is true exactly once.
    ///
    /// A new unlock raises the celebration prompt, a repeat raises the
    /// fragment's detail prompt.
    pub fn unlock_fragment(&mut self, fragment: FragmentId) -> UnlockOutcome {
        let was_new = self.fragments.insert(fragment);
        self.active_prompt = Some(if was_new {
            PromptRef::Celebration(fragment)
        } else {
            PromptRef::FragmentDetail(fragment)
        });

        if was_new {
            info!(%fragment, "fragment unlocked");
        } else {
            debug!(%fragment, "fragment already unlocked");
        }

        self.persist();
        UnlockOutcome { fragment, was_new }
    }

    /// Set a one-way flag. Returns whether it was newly set.
    pub fn set_flag(&mut self, flag: ProgressFlag) -> bool {
        let newly_set = self.flags.insert(flag);
        if newly_set {
            info!(%flag, "progress flag set");
            self.persist();
        }
        newly_set
    }

    /// Record the latest allegiance outcome, overwriting any earlier one.
    pub fn record_allegiance(&mut self, outcome: AllegianceOutcome) {
        info!(?outcome, previous = ?self.allegiance, "allegiance recorded");
        self.allegiance = Some(outcome);
        self.active_prompt = Some(PromptRef::AllegianceReveal);
        self.persist();
    }

    /// Point the player at a prompt.
    pub fn set_active_prompt(&mut self, prompt: PromptRef) {
        self.active_prompt = Some(prompt);
        self.persist();
    }

    /// Close whatever prompt is open.
    pub fn dismiss_prompt(&mut self) {
        if self.active_prompt.take().is_some() {
            self.persist();
        }
    }

    /// Erase all progress, in memory and in storage. Irreversible.
    pub fn wipe_all(&mut self) {
        info!(fragments = self.fragments.len(), "wiping all progress");
        self.fragments.clear();
        self.flags.clear();
        self.foreign_flags.clear();
        self.allegiance = None;
        self.active_prompt = None;

        if let Err(err) = self.store.clear() {
            warn!(error = %err, "ledger wipe could not clear storage");
        }
    }

    /// Whether `fragment` has been unlocked.
    pub fn is_unlocked(&self, fragment: FragmentId) -> bool {
        self.fragments.contains(&fragment)
    }

    /// Whether `flag` has been set.
    pub fn is_flag_set(&self, flag: ProgressFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// The last recorded quiz result, if any.
    pub fn allegiance(&self) -> Option<AllegianceOutcome> {
        self.allegiance
    }

    /// The modal currently owed to the player.
    pub fn active_prompt(&self) -> Option<PromptRef> {
        self.active_prompt
    }

    /// Unlocked fragments in ascending order.
    pub fn unlocked_fragments(&self) -> impl Iterator<Item = FragmentId> + '_ {
        self.fragments.iter().copied()
    }

    /// Collection progress summary.
    pub fn progress(&self) -> ProgressSummary {
        let unlocked = self.fragments.len();
        let total = FRAGMENT_COUNT as usize;
        ProgressSummary {
            unlocked,
            total,
            percent: (unlocked * 100 / total) as u8,
            fragments: self.fragments.iter().copied().collect(),
        }
    }
}

impl std::fmt::Debug for ProgressionLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressionLedger")
            .field("fragments", &self.fragments)
            .field("allegiance", &self.allegiance)
            .field("flags", &self.flags)
            .field("active_prompt", &self.active_prompt)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn frag(id: u8) -> FragmentId {
        FragmentId::new(id).unwrap()
    }

    #[test]
    fn test_fresh_ledger_is_empty() {
        let ledger = ProgressionLedger::load_or_init(MemoryStore::new());
        assert_eq!(ledger.progress().unlocked, 0);
        assert!(ledger.allegiance().is_none());
        assert!(ledger.active_prompt().is_none());
        for flag in ProgressFlag::ALL {
            assert!(!ledger.is_flag_set(flag));
        }
    }

    #[test]
    fn test_unlock_is_idempotent() {
        let mut ledger = ProgressionLedger::load_or_init(MemoryStore::new());

        let first = ledger.unlock_fragment(frag(5));
        let second = ledger.unlock_fragment(frag(5));

        assert!(first.was_new);
        assert!(!second.was_new);
        assert_eq!(ledger.progress().unlocked, 1);
    }

    #[test]
    fn test_repeat_unlock_reshows_detail_prompt() {
        let mut ledger = ProgressionLedger::load_or_init(MemoryStore::new());

        ledger.unlock_fragment(frag(2));
        assert_eq!(ledger.active_prompt(), Some(PromptRef::Celebration(frag(2))));

        ledger.dismiss_prompt();
        ledger.unlock_fragment(frag(2));
        assert_eq!(ledger.active_prompt(), Some(PromptRef::FragmentDetail(frag(2))));
    }

    #[test]
    fn test_fragments_never_shrink() {
        let mut ledger = ProgressionLedger::load_or_init(MemoryStore::new());
        let mut last = 0;

        for id in [3, 7, 3, 1, 12, 7, 7, 9] {
            ledger.unlock_fragment(frag(id));
            ledger.set_flag(ProgressFlag::CipherPassed);
            ledger.record_allegiance(AllegianceOutcome::Bastion);
            ledger.dismiss_prompt();

            let now = ledger.progress().unlocked;
            assert!(now >= last);
            last = now;
        }
        assert_eq!(last, 5);
    }

    #[test]
    fn test_mutations_persist_and_reload() {
        let store = MemoryStore::new();
        {
            let mut ledger = ProgressionLedger::load_or_init(store.clone());
            ledger.unlock_fragment(frag(4));
            ledger.set_flag(ProgressFlag::SwapPassed);
            ledger.record_allegiance(AllegianceOutcome::Unaligned);
        }

        let reloaded = ProgressionLedger::load_or_init(store);
        assert!(reloaded.is_unlocked(frag(4)));
        assert!(reloaded.is_flag_set(ProgressFlag::SwapPassed));
        assert_eq!(reloaded.allegiance(), Some(AllegianceOutcome::Unaligned));
        assert_eq!(reloaded.active_prompt(), Some(PromptRef::AllegianceReveal));
    }

    #[test]
    fn test_set_flag_is_one_way() {
        let store = MemoryStore::new();
        let mut ledger = ProgressionLedger::load_or_init(store.clone());

        assert!(ledger.set_flag(ProgressFlag::DeductionPassed));
        let writes = store.write_count();
        assert!(!ledger.set_flag(ProgressFlag::DeductionPassed));
        assert_eq!(store.write_count(), writes);
        assert!(ledger.is_flag_set(ProgressFlag::DeductionPassed));
    }

    #[test]
    fn test_allegiance_overwrites() {
        let mut ledger = ProgressionLedger::load_or_init(MemoryStore::new());
        ledger.record_allegiance(AllegianceOutcome::Aurum);
        ledger.record_allegiance(AllegianceOutcome::Drift);
        assert_eq!(ledger.allegiance(), Some(AllegianceOutcome::Drift));
    }

    #[test]
    fn test_corrupt_record_falls_back_to_default() {
        let ledger = ProgressionLedger::load_or_init(MemoryStore::with_contents("{broken"));
        assert_eq!(ledger.progress().unlocked, 0);
    }

    #[test]
    fn test_bad_prompt_keeps_fragments_through_next_write() {
        let store = MemoryStore::with_contents(
            r#"{"unlockedFragments":[1,2,3],"activePrompt":{"kind":"codex"}}"#,
        );
        let mut ledger = ProgressionLedger::load_or_init(store.clone());
        assert_eq!(ledger.progress().unlocked, 3);
        assert!(ledger.active_prompt().is_none());

        ledger.set_flag(ProgressFlag::CipherPassed);

        let record = LedgerRecord::from_json(&store.contents().unwrap()).unwrap();
        assert_eq!(record.unlocked_fragments, vec![1, 2, 3]);
    }

    #[test]
    fn test_unknown_allegiance_keeps_rest_of_record() {
        let store = MemoryStore::with_contents(
            r#"{"unlockedFragments":[4],"allegianceResult":"verdant","flags":{"swapPassed":true}}"#,
        );
        let ledger = ProgressionLedger::load_or_init(store);

        assert!(ledger.is_unlocked(frag(4)));
        assert!(ledger.is_flag_set(ProgressFlag::SwapPassed));
        assert!(ledger.allegiance().is_none());
    }

    #[test]
    fn test_old_record_loads_with_defaults() {
        let store = MemoryStore::with_contents(r#"{"unlockedFragments":[1,2,99]}"#);
        let ledger = ProgressionLedger::load_or_init(store);

        assert!(ledger.is_unlocked(frag(1)));
        assert!(ledger.is_unlocked(frag(2)));
        assert_eq!(ledger.progress().unlocked, 2);
        assert!(!ledger.is_flag_set(ProgressFlag::EvasionPassed));
    }

    #[test]
    fn test_unknown_flags_survive_round_trip() {
        let store = MemoryStore::with_contents(r#"{"flags":{"starChartPassed":true}}"#);
        let mut ledger = ProgressionLedger::load_or_init(store.clone());
        ledger.unlock_fragment(frag(8));

        let record = LedgerRecord::from_json(&store.contents().unwrap()).unwrap();
        assert_eq!(record.flags.get("starChartPassed"), Some(&true));
        assert_eq!(record.flags.get("cipherPassed"), Some(&false));
    }

    #[test]
    fn test_write_failure_is_not_fatal() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let mut ledger = ProgressionLedger::load_or_init(store.clone());

        let outcome = ledger.unlock_fragment(frag(6));

        assert!(outcome.was_new);
        assert!(ledger.is_unlocked(frag(6)));
        assert!(store.contents().is_none());
    }

    #[test]
    fn test_wipe_all_clears_memory_and_storage() {
        let store = MemoryStore::new();
        let mut ledger = ProgressionLedger::load_or_init(store.clone());
        ledger.unlock_fragment(frag(1));
        ledger.set_flag(ProgressFlag::PlacementPassed);
        ledger.record_allegiance(AllegianceOutcome::Cinder);

        ledger.wipe_all();

        assert_eq!(ledger.progress().unlocked, 0);
        assert!(!ledger.is_flag_set(ProgressFlag::PlacementPassed));
        assert!(ledger.allegiance().is_none());
        assert!(store.contents().is_none());

        let outcome = ledger.unlock_fragment(frag(1));
        assert!(outcome.was_new);
    }

    #[test]
    fn test_progress_summary() {
        let mut ledger = ProgressionLedger::load_or_init(MemoryStore::new());
        for id in [9, 3, 6] {
            ledger.unlock_fragment(frag(id));
        }

        let summary = ledger.progress();
        assert_eq!(summary.unlocked, 3);
        assert_eq!(summary.total, 12);
        assert_eq!(summary.percent, 25);
        assert_eq!(summary.fragments, vec![frag(3), frag(6), frag(9)]);
    }

    #[test]
    fn test_shared_handle() {
        let ledger = ProgressionLedger::shared(MemoryStore::new());
        let other = Rc::clone(&ledger);

        other.borrow_mut().unlock_fragment(frag(10));
        assert!(ledger.borrow().is_unlocked(frag(10)));
    }
}
