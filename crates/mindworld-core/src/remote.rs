//! Remote backend seams.
//!
//! The engine talks to its environment through two traits: a
//! [`RemoteLedger`] for the authoritative award/quest/event procedures and
//! a [`TaskSource`] for reading the task rows behind daily progress.
//! Shapes only - the backing technology (a hosted Postgres with row-level
//! access control and an atomic `award_xp` procedure, in the production
//! app) is the embedder's concern.
//!
//! All ledger calls are made from spawned reconciliation tasks, never from
//! the store's synchronous mutation path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::RemoteResult;
use crate::identity::UserId;
use crate::task::{RoadmapId, TaskChange, TaskRecord};

/// Authoritative totals returned by the remote award procedure.
///
/// The server may disagree with the local optimistic value (multi-device
/// usage, server-side bonus rules); the reconciliation layer overwrites
/// local derived fields from this receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardReceipt {
    /// Server-side cumulative XP after the award.
    pub total_xp: u64,
    /// Server-side streak, when the procedure computes one.
    pub streak_count: Option<u32>,
}

/// The remote authoritative ledger.
#[async_trait]
pub trait RemoteLedger: Send + Sync {
    /// Record an XP award and return the authoritative totals.
    ///
    /// Must be atomic server-side: concurrent awards from multiple devices
    /// sum correctly rather than overwriting each other.
    async fn award(
        &self,
        user: &UserId,
        activity: &str,
        amount: u32,
        metadata: Value,
    ) -> RemoteResult<AwardReceipt>;

    /// Mark a daily quest complete.
    ///
    /// Keyed by `(user, day, quest)`; repeated calls for the same key are
    /// idempotent writes, not inserts.
    async fn upsert_quest(
        &self,
        user: &UserId,
        day_key: &str,
        quest_id: &str,
        completed: bool,
    ) -> RemoteResult<()>;

    /// Best-effort analytics logging.
    ///
    /// Implementations swallow their own failures; nothing in the engine's
    /// flows depends on this call succeeding.
    async fn log_event(&self, user: &UserId, kind: &str, payload: Value);
}

/// Read access to the task rows backing daily progress.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Fetch every task of the roadmap, regardless of status.
    async fn fetch_tasks(
        &self,
        user: &UserId,
        roadmap: &RoadmapId,
    ) -> RemoteResult<Vec<TaskRecord>>;

    /// Subscribe to task change notifications.
    fn changes(&self) -> broadcast::Receiver<TaskChange>;
}
