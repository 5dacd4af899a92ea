//! Mock backend implementations for testing
//!
//! Provides in-memory implementations of the remote seams so engine and
//! embedder tests can run without a real backend. Call counters allow
//! spy assertions on remote traffic (e.g. "no identity means zero remote
//! calls").
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mindworld_core::{MockLedger, RemoteLedger, UserId};
//!
//! let ledger = MockLedger::new();
//! let receipt = ledger
//!     .award(&UserId::new("u1"), "focus", 40, serde_json::json!({}))
//!     .await
//!     .unwrap();
//! assert_eq!(receipt.total_xp, 40);
//! assert_eq!(ledger.award_calls(), 1);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::{RemoteError, RemoteResult};
use crate::identity::UserId;
use crate::remote::{AwardReceipt, RemoteLedger, TaskSource};
use crate::task::{RoadmapId, TaskChange, TaskRecord};

/// In-memory implementation of [`RemoteLedger`].
///
/// Maintains its own cumulative total so unscripted awards behave like the
/// real atomic procedure. Receipts can be scripted to simulate server-side
/// divergence (multi-device totals, bonus rules), and calls can be forced
/// to fail to exercise the swallow-and-log paths.
pub struct MockLedger {
    /// Server-side cumulative XP
    total_xp: AtomicU64,
    /// Streak returned with each receipt, when set
    streak: Mutex<Option<u32>>,
    /// Receipts to return ahead of the computed one, in order
    scripted: Mutex<VecDeque<AwardReceipt>>,
    /// When set, award and upsert calls fail
    failing: AtomicBool,
    award_calls: AtomicUsize,
    quest_calls: AtomicUsize,
    event_calls: AtomicUsize,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    /// Create a ledger starting from zero total XP.
    pub fn new() -> Self {
        Self {
            total_xp: AtomicU64::new(0),
            streak: Mutex::new(None),
            scripted: Mutex::new(VecDeque::new()),
            failing: AtomicBool::new(false),
            award_calls: AtomicUsize::new(0),
            quest_calls: AtomicUsize::new(0),
            event_calls: AtomicUsize::new(0),
        }
    }

    /// Create a ledger with an existing server-side total.
    pub fn with_total(total_xp: u64) -> Self {
        let ledger = Self::new();
        ledger.total_xp.store(total_xp, Ordering::Relaxed);
        ledger
    }

    /// Include the given streak in every receipt.
    pub fn set_streak(&self, streak: Option<u32>) {
        *self.streak.lock().unwrap_or_else(PoisonError::into_inner) = streak;
    }

    /// Queue a receipt to return for the next award call.
    pub fn script_receipt(&self, receipt: AwardReceipt) {
        self.scripted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(receipt);
    }

    /// Make subsequent award/upsert calls fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// Number of award calls received.
    pub fn award_calls(&self) -> usize {
        self.award_calls.load(Ordering::Relaxed)
    }

    /// Number of quest upsert calls received.
    pub fn quest_calls(&self) -> usize {
        self.quest_calls.load(Ordering::Relaxed)
    }

    /// Number of event log calls received.
    pub fn event_calls(&self) -> usize {
        self.event_calls.load(Ordering::Relaxed)
    }

    /// Total remote calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.award_calls() + self.quest_calls() + self.event_calls()
    }

    /// Current server-side total.
    pub fn total_xp(&self) -> u64 {
        self.total_xp.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RemoteLedger for MockLedger {
    async fn award(
        &self,
        _user: &UserId,
        _activity: &str,
        amount: u32,
        _metadata: Value,
    ) -> RemoteResult<AwardReceipt> {
        self.award_calls.fetch_add(1, Ordering::Relaxed);

        if self.failing.load(Ordering::Relaxed) {
            return Err(RemoteError::procedure("award_xp", "injected failure"));
        }

        if let Some(receipt) = self
            .scripted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
        {
            return Ok(receipt);
        }

        let total_xp = self
            .total_xp
            .fetch_add(amount as u64, Ordering::Relaxed)
            + amount as u64;
        let streak_count = *self.streak.lock().unwrap_or_else(PoisonError::into_inner);

        Ok(AwardReceipt {
            total_xp,
            streak_count,
        })
    }

    async fn upsert_quest(
        &self,
        _user: &UserId,
        _day_key: &str,
        _quest_id: &str,
        _completed: bool,
    ) -> RemoteResult<()> {
        self.quest_calls.fetch_add(1, Ordering::Relaxed);

        if self.failing.load(Ordering::Relaxed) {
            return Err(RemoteError::procedure("upsert_quest", "injected failure"));
        }

        Ok(())
    }

    async fn log_event(&self, _user: &UserId, _kind: &str, _payload: Value) {
        self.event_calls.fetch_add(1, Ordering::Relaxed);
    }
}

/// In-memory implementation of [`TaskSource`].
///
/// Rows are set per (user, roadmap) pair; pushing a change both updates
/// the rows and broadcasts the notification, like a realtime-enabled
/// remote table would.
pub struct MockTaskSource {
    rows: Mutex<HashMap<(UserId, RoadmapId), Vec<TaskRecord>>>,
    changes_tx: broadcast::Sender<TaskChange>,
    failing: AtomicBool,
    fetch_calls: AtomicUsize,
}

impl Default for MockTaskSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTaskSource {
    /// Create an empty task source.
    pub fn new() -> Self {
        let (changes_tx, _) = broadcast::channel(64);
        Self {
            rows: Mutex::new(HashMap::new()),
            changes_tx,
            failing: AtomicBool::new(false),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    /// Replace the rows for a (user, roadmap) pair.
    pub fn set_tasks(&self, user: UserId, roadmap: RoadmapId, tasks: Vec<TaskRecord>) {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((user, roadmap), tasks);
    }

    /// Apply a change to the rows and broadcast the notification.
    pub fn push_change(&self, change: TaskChange) {
        {
            let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
            let tasks = rows
                .entry((change.user.clone(), change.roadmap.clone()))
                .or_default();
            match change.kind {
                crate::task::TaskChangeKind::Deleted => {
                    tasks.retain(|t| t.id != change.task.id);
                }
                _ => {
                    if let Some(existing) =
                        tasks.iter_mut().find(|t| t.id == change.task.id)
                    {
                        *existing = change.task.clone();
                    } else {
                        tasks.push(change.task.clone());
                    }
                }
            }
        }
        let _ = self.changes_tx.send(change);
    }

    /// Make subsequent fetches fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// Number of fetch calls received.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TaskSource for MockTaskSource {
    async fn fetch_tasks(
        &self,
        user: &UserId,
        roadmap: &RoadmapId,
    ) -> RemoteResult<Vec<TaskRecord>> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);

        if self.failing.load(Ordering::Relaxed) {
            return Err(RemoteError::procedure("fetch_tasks", "injected failure"));
        }

        Ok(self
            .rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(user.clone(), roadmap.clone()))
            .cloned()
            .unwrap_or_default())
    }

    fn changes(&self) -> broadcast::Receiver<TaskChange> {
        self.changes_tx.subscribe()
    }
}
