//! The local progress store.
//!
//! Single source of truth for client-visible progress state: stats, mood,
//! the daily quest set, world position, notes, and unlocked content.
//! Reads and local writes are synchronous; remote confirmation is
//! asynchronous and fire-and-forget (see [`crate::reconcile`]).
//!
//! A mutation never fails from the caller's perspective. Persistence and
//! remote errors are logged and swallowed; the in-memory state is always
//! updated first and remains current truth until a successful remote
//! confirmation overwrites the derived fields.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use mindworld_core::{AwardReceipt, DayBoundary, IdentityProvider, RemoteLedger};

use crate::catalog::{Activity, DAILY_QUESTS};
use crate::config::EngineConfig;
use crate::event::{EventBus, ProgressEvent};
use crate::reconcile::Reconciler;
use crate::snapshot::{
    JsonSnapshots, MemorySnapshots, Note, ProfileSnapshot, SNAPSHOT_VERSION, SnapshotStore,
};
use crate::stats::{Mood, Stats};

/// Content available to a fresh profile.
const DEFAULT_UNLOCKED: [&str; 3] = ["hypno-calm-60", "focus-25", "browser-notion"];

/// Where a fresh avatar stands in the world.
const DEFAULT_POSITION: (f32, f32) = (160.0, 820.0);

struct ProfileState {
    stats: Stats,
    mood: Mood,
    quest_day: String,
    quests: BTreeMap<String, bool>,
    position: (f32, f32),
    notes: Vec<Note>,
    unlocked: BTreeSet<String>,
}

impl ProfileState {
    fn fresh(quest_day: String) -> Self {
        Self {
            stats: Stats::default(),
            mood: Mood::default(),
            quest_day,
            quests: BTreeMap::new(),
            position: DEFAULT_POSITION,
            notes: Vec::new(),
            unlocked: DEFAULT_UNLOCKED.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn from_snapshot(snapshot: ProfileSnapshot, today: &str) -> Self {
        // Quest completions are day-scoped: a snapshot from a previous
        // day loads with an empty set.
        let (quest_day, quests) = if snapshot.quest_day == today {
            (snapshot.quest_day, snapshot.quests)
        } else {
            (today.to_string(), BTreeMap::new())
        };

        Self {
            stats: snapshot.stats,
            mood: snapshot.mood,
            quest_day,
            quests,
            position: snapshot.position,
            notes: snapshot.notes,
            unlocked: snapshot.unlocked,
        }
    }

    fn to_snapshot(&self) -> ProfileSnapshot {
        ProfileSnapshot {
            version: SNAPSHOT_VERSION,
            stats: self.stats,
            mood: self.mood,
            quest_day: self.quest_day.clone(),
            quests: self.quests.clone(),
            position: self.position,
            notes: self.notes.clone(),
            unlocked: self.unlocked.clone(),
        }
    }
}

struct StoreInner {
    state: RwLock<ProfileState>,
    snapshots: Arc<dyn SnapshotStore>,
    events: EventBus,
    reconciler: Reconciler,
    days: DayBoundary,
}

/// The progress store.
///
/// Cheap to clone; clones share the same state. Instantiate one per
/// profile and inject it where mutations happen - there is no ambient
/// global instance, so tests can run isolated stores side by side.
#[derive(Clone)]
pub struct ProgressStore {
    inner: Arc<StoreInner>,
}

impl ProgressStore {
    /// Create a store with a file-backed snapshot (when the config names
    /// a path) and the system day boundary.
    pub fn new(
        config: EngineConfig,
        identity: Arc<dyn IdentityProvider>,
        remote: Arc<dyn RemoteLedger>,
    ) -> Self {
        let snapshots: Arc<dyn SnapshotStore> = match &config.snapshot_path {
            Some(path) => Arc::new(JsonSnapshots::new(path)),
            None => Arc::new(MemorySnapshots::new()),
        };
        Self::with_parts(config, identity, remote, snapshots, DayBoundary::system())
    }

    /// Create a store with every collaborator injected.
    pub fn with_parts(
        config: EngineConfig,
        identity: Arc<dyn IdentityProvider>,
        remote: Arc<dyn RemoteLedger>,
        snapshots: Arc<dyn SnapshotStore>,
        days: DayBoundary,
    ) -> Self {
        let today = days.day_key();
        let state = match snapshots.load() {
            Ok(Some(snapshot)) => ProfileState::from_snapshot(snapshot, &today),
            Ok(None) => ProfileState::fresh(today),
            Err(e) => {
                warn!(error = %e, "profile snapshot load failed; starting fresh");
                ProfileState::fresh(today)
            }
        };

        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(state),
                snapshots,
                events: EventBus::new(config.event_capacity),
                reconciler: Reconciler::new(remote, identity, config.remote_timeout),
                days,
            }),
        }
    }

    // Mutations never fail: recover the guard from a poisoned lock.
    fn read_state(&self) -> RwLockReadGuard<'_, ProfileState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ProfileState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self) {
        let snapshot = self.read_state().to_snapshot();
        if let Err(e) = self.inner.snapshots.save(&snapshot) {
            warn!(error = %e, "profile snapshot write failed");
        }
    }

    /// Subscribe to progress events.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.inner.events.subscribe()
    }

    /// The day-boundary service this store scopes its quest set by.
    pub fn days(&self) -> &DayBoundary {
        &self.inner.days
    }

    /// Current stats.
    pub fn stats(&self) -> Stats {
        self.read_state().stats
    }

    /// Current mood.
    pub fn mood(&self) -> Mood {
        self.read_state().mood
    }

    /// Current world position.
    pub fn position(&self) -> (f32, f32) {
        self.read_state().position
    }

    /// Notes captured so far, oldest first.
    pub fn notes(&self) -> Vec<Note> {
        self.read_state().notes.clone()
    }

    /// Today's quest completion set.
    pub fn quests(&self) -> BTreeMap<String, bool> {
        self.read_state().quests.clone()
    }

    /// Whether a quest is complete today.
    pub fn is_quest_complete(&self, quest_id: &str) -> bool {
        self.read_state()
            .quests
            .get(quest_id)
            .copied()
            .unwrap_or(false)
    }

    /// Whether every daily quest is complete, making the full-clear bonus
    /// available. The store does not award the bonus itself; the call
    /// site awards [`Activity::FullClear`] once when this flips.
    pub fn full_clear_pending(&self) -> bool {
        let state = self.read_state();
        DAILY_QUESTS
            .iter()
            .all(|q| state.quests.get(q.id).copied().unwrap_or(false))
    }

    /// Whether a content id has been unlocked.
    pub fn is_unlocked(&self, content_id: &str) -> bool {
        self.read_state().unlocked.contains(content_id)
    }

    /// Unlocked content ids.
    pub fn unlocked(&self) -> BTreeSet<String> {
        self.read_state().unlocked.clone()
    }

    /// Award XP for a catalog activity.
    pub fn award(&self, activity: Activity, metadata: Value) {
        self.award_labeled(activity.label().to_string(), activity.reward() as i64, metadata);
    }

    /// Award an arbitrary amount under a free-form activity label.
    ///
    /// Negative amounts are clamped to zero rather than decreasing XP.
    pub fn award_raw(&self, amount: i64, activity: impl Into<String>, metadata: Value) {
        self.award_labeled(activity.into(), amount, metadata);
    }

    fn award_labeled(&self, activity: String, amount: i64, metadata: Value) {
        let amount = if amount < 0 {
            debug!(amount, activity = %activity, "negative award clamped to zero");
            0
        } else {
            u32::try_from(amount).unwrap_or(u32::MAX)
        };

        let (stats, gained) = {
            let mut state = self.write_state();
            let gained = state.stats.apply_award(amount);
            (state.stats, gained)
        };
        self.persist();

        // Unconditional, even for zero-value awards: feedback effects
        // (chime, sparkle) key off this event.
        self.inner.events.emit(ProgressEvent::XpAwarded {
            activity: activity.clone(),
            amount,
            xp: stats.xp,
            level: stats.level,
            leveled_up: gained > 0,
        });

        let seq = self.inner.reconciler.next_seq();
        self.inner
            .reconciler
            .spawn_award(self.clone(), seq, activity, amount, metadata);
    }

    /// Mark a quest complete for today.
    ///
    /// Idempotent: completing an already-completed quest re-persists but
    /// changes nothing else observable, and emits no second event.
    pub fn complete_quest(&self, quest_id: impl Into<String>) {
        let quest_id = quest_id.into();
        let day_key = self.inner.days.day_key();

        let first = {
            let mut state = self.write_state();
            let first = !state.quests.get(&quest_id).copied().unwrap_or(false);
            state.quests.insert(quest_id.clone(), true);
            first
        };
        self.persist();

        if first {
            self.inner.events.emit(ProgressEvent::QuestCompleted {
                quest_id: quest_id.clone(),
            });
        }

        self.inner.reconciler.spawn_quest_upsert(day_key, quest_id);
    }

    /// Increment the consecutive-day streak. No upper bound; leaves XP
    /// and level alone.
    pub fn inc_streak(&self) {
        let streak = {
            let mut state = self.write_state();
            state.stats.streak += 1;
            state.stats.streak
        };
        self.persist();
        self.inner.events.emit(ProgressEvent::StreakChanged { streak });
    }

    /// Clear the daily quest set for a new day.
    ///
    /// The store never detects rollover itself; the embedding app calls
    /// this when [`DayBoundary`] says the day changed.
    pub fn reset_daily(&self) {
        let day_key = self.inner.days.day_key();
        {
            let mut state = self.write_state();
            state.quests.clear();
            state.quest_day = day_key.clone();
        }
        self.persist();
        self.inner.events.emit(ProgressEvent::QuestsReset { day_key });
    }

    /// Set the current mood.
    pub fn set_mood(&self, mood: Mood) {
        self.write_state().mood = mood;
        self.persist();
        self.inner.events.emit(ProgressEvent::MoodChanged { mood });
    }

    /// Move the avatar.
    pub fn set_position(&self, x: f32, y: f32) {
        self.write_state().position = (x, y);
        self.persist();
        self.inner.events.emit(ProgressEvent::PositionChanged { x, y });
    }

    /// Append a note.
    pub fn add_note(&self, text: impl Into<String>) {
        let at = self.inner.days.now_utc();
        self.write_state().notes.push(Note {
            text: text.into(),
            at,
        });
        self.persist();
        self.inner.events.emit(ProgressEvent::NoteAdded { at });
    }

    /// Unlock a content id. Idempotent.
    pub fn unlock(&self, content_id: impl Into<String>) {
        let content_id = content_id.into();
        let newly = self.write_state().unlocked.insert(content_id.clone());
        self.persist();
        if newly {
            self.inner
                .events
                .emit(ProgressEvent::ContentUnlocked { content_id });
        }
    }

    /// Apply server-confirmed totals over the local optimistic state.
    ///
    /// Only the derived fields move: `xp` and `level` are re-derived from
    /// the authoritative total, and `streak` is overwritten only when the
    /// server returned one. Responses older than the last applied one are
    /// discarded.
    pub(crate) fn apply_remote(&self, seq: u64, receipt: AwardReceipt) {
        let stats = {
            let mut state = self.write_state();
            if !self.inner.reconciler.admit(seq) {
                debug!(seq, "stale reconciliation response discarded");
                return;
            }
            state.stats.set_cumulative(receipt.total_xp);
            if let Some(streak) = receipt.streak_count {
                state.stats.streak = streak;
            }
            state.stats
        };
        self.persist();

        self.inner.events.emit(ProgressEvent::Reconciled {
            total_xp: receipt.total_xp,
            xp: stats.xp,
            level: stats.level,
            streak: receipt.streak_count,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mindworld_core::{Anonymous, FixedClock, MockLedger};
    use serde_json::json;

    // No runtime here: the store must still mutate and persist locally,
    // skipping remote sync.
    fn test_store() -> (ProgressStore, Arc<MemorySnapshots>, FixedClock) {
        let clock = FixedClock::at(Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap());
        let snapshots = Arc::new(MemorySnapshots::new());
        let store = ProgressStore::with_parts(
            EngineConfig::default(),
            Arc::new(Anonymous),
            Arc::new(MockLedger::new()),
            snapshots.clone(),
            DayBoundary::new(Arc::new(clock.clone())),
        );
        (store, snapshots, clock)
    }

    #[test]
    fn award_applies_catalog_reward_and_emits() {
        let (store, _, _) = test_store();
        let mut rx = store.subscribe();

        store.award(Activity::FocusSession, json!({}));

        let stats = store.stats();
        assert_eq!((stats.xp, stats.level), (75, 7));
        assert!(matches!(
            rx.try_recv().unwrap(),
            ProgressEvent::XpAwarded { amount: 40, .. }
        ));
    }

    #[test]
    fn zero_award_still_emits() {
        let (store, _, _) = test_store();
        let mut rx = store.subscribe();

        store.award_raw(0, "noop", json!({}));

        assert!(matches!(
            rx.try_recv().unwrap(),
            ProgressEvent::XpAwarded { amount: 0, .. }
        ));
    }

    #[test]
    fn negative_award_is_clamped() {
        let (store, _, _) = test_store();
        let before = store.stats();

        store.award_raw(-10, "bogus", json!({}));

        let after = store.stats();
        assert_eq!((after.xp, after.level), (before.xp, before.level));
    }

    #[test]
    fn quest_completion_is_idempotent() {
        let (store, _, _) = test_store();
        let mut rx = store.subscribe();

        store.complete_quest("start-hypno");
        store.complete_quest("start-hypno");

        assert!(store.is_quest_complete("start-hypno"));
        assert!(matches!(
            rx.try_recv().unwrap(),
            ProgressEvent::QuestCompleted { .. }
        ));
        // no second completion event
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn full_clear_requires_every_daily_quest() {
        let (store, _, _) = test_store();

        for quest in DAILY_QUESTS.iter().take(DAILY_QUESTS.len() - 1) {
            store.complete_quest(quest.id);
        }
        assert!(!store.full_clear_pending());

        store.complete_quest(DAILY_QUESTS[DAILY_QUESTS.len() - 1].id);
        assert!(store.full_clear_pending());
    }

    #[test]
    fn streak_increments_without_touching_xp() {
        let (store, _, _) = test_store();
        let before = store.stats();

        store.inc_streak();

        let after = store.stats();
        assert_eq!(after.streak, before.streak + 1);
        assert_eq!((after.xp, after.level), (before.xp, before.level));
    }

    #[test]
    fn reset_daily_clears_the_quest_set() {
        let (store, _, _) = test_store();
        store.complete_quest("pick-focus");

        store.reset_daily();

        assert!(!store.is_quest_complete("pick-focus"));
        assert!(store.quests().is_empty());
    }

    #[test]
    fn mood_and_position_are_plain_assignments() {
        let (store, _, _) = test_store();

        store.set_mood(Mood::Stressed);
        store.set_position(300.0, 640.0);

        assert_eq!(store.mood(), Mood::Stressed);
        assert_eq!(store.position(), (300.0, 640.0));
    }

    #[test]
    fn unlock_is_idempotent_and_seeded() {
        let (store, _, _) = test_store();
        assert!(store.is_unlocked("hypno-calm-60"));

        let mut rx = store.subscribe();
        store.unlock("hypno-deep-120");
        store.unlock("hypno-deep-120");

        assert!(store.is_unlocked("hypno-deep-120"));
        assert!(matches!(
            rx.try_recv().unwrap(),
            ProgressEvent::ContentUnlocked { .. }
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn notes_append_in_order() {
        let (store, _, _) = test_store();

        store.add_note("first");
        store.add_note("second");

        let notes = store.notes();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].text, "first");
        assert_eq!(notes[1].text, "second");
    }

    #[test]
    fn restart_restores_the_persisted_profile() {
        let (store, snapshots, clock) = test_store();
        store.award(Activity::HypnosisSession, json!({}));
        store.set_mood(Mood::Confident);
        store.complete_quest("add-note");
        let expected = store.stats();

        let restarted = ProgressStore::with_parts(
            EngineConfig::default(),
            Arc::new(Anonymous),
            Arc::new(MockLedger::new()),
            snapshots,
            DayBoundary::new(Arc::new(clock)),
        );

        assert_eq!(restarted.stats(), expected);
        assert_eq!(restarted.mood(), Mood::Confident);
        assert!(restarted.is_quest_complete("add-note"));
    }

    #[test]
    fn stale_snapshot_loads_with_an_empty_quest_set() {
        let (store, snapshots, clock) = test_store();
        store.complete_quest("pick-focus");
        let streak_before = store.stats().streak;

        // next morning
        clock.set(Utc.with_ymd_and_hms(2026, 3, 11, 7, 0, 0).unwrap());
        let restarted = ProgressStore::with_parts(
            EngineConfig::default(),
            Arc::new(Anonymous),
            Arc::new(MockLedger::new()),
            snapshots,
            DayBoundary::new(Arc::new(clock)),
        );

        assert!(restarted.quests().is_empty());
        // quest scoping does not disturb the rest of the profile
        assert_eq!(restarted.stats().streak, streak_before);
    }
}
