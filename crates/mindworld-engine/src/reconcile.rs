//! Remote reconciliation.
//!
//! Local mutations take effect before any network round trip; this module
//! confirms them against the authoritative ledger in the background and
//! feeds confirmed totals back into the store. Fire-and-forget: a failed
//! or timed-out call is logged and dropped, and the local optimistic
//! state stands until the next successful confirmation. There is no retry
//! queue - duplicate or missed awards are an accepted inconsistency class.
//!
//! Responses can arrive out of order. Every award carries a sequence
//! number, and a response is only applied while no newer response has
//! been applied yet, so a slow round trip cannot clobber a fresher total.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::{Value, json};
use tracing::{debug, warn};

use mindworld_core::{IdentityProvider, RemoteLedger, UserId};

use crate::store::ProgressStore;

pub(crate) struct Reconciler {
    remote: Arc<dyn RemoteLedger>,
    identity: Arc<dyn IdentityProvider>,
    timeout: Duration,
    next_seq: AtomicU64,
    last_applied: AtomicU64,
}

impl Reconciler {
    pub(crate) fn new(
        remote: Arc<dyn RemoteLedger>,
        identity: Arc<dyn IdentityProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            remote,
            identity,
            timeout,
            next_seq: AtomicU64::new(0),
            last_applied: AtomicU64::new(0),
        }
    }

    /// Sequence number for the next award.
    pub(crate) fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Whether a response with this sequence may still be applied.
    ///
    /// Callers must hold the store's state lock so that admission and
    /// application are one atomic step.
    pub(crate) fn admit(&self, seq: u64) -> bool {
        let prev = self.last_applied.fetch_max(seq, Ordering::AcqRel);
        seq >= prev
    }

    fn gated_user(&self, what: &str) -> Option<UserId> {
        match self.identity.current_user() {
            Some(user) => Some(user),
            None => {
                debug!(what, "remote sync skipped (no user)");
                None
            }
        }
    }

    /// Confirm an award against the remote ledger.
    ///
    /// Returns immediately; the round trip happens on a spawned task. No
    /// identity or no async runtime means no remote call at all.
    pub(crate) fn spawn_award(
        &self,
        store: ProgressStore,
        seq: u64,
        activity: String,
        amount: u32,
        metadata: Value,
    ) {
        let Some(user) = self.gated_user("award") else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!(activity = %activity, "remote sync skipped (no async runtime)");
            return;
        };

        let remote = Arc::clone(&self.remote);
        let timeout = self.timeout;
        handle.spawn(async move {
            remote
                .log_event(
                    &user,
                    "xp_award",
                    json!({ "activity": &activity, "amount": amount }),
                )
                .await;

            match tokio::time::timeout(
                timeout,
                remote.award(&user, &activity, amount, metadata),
            )
            .await
            {
                Ok(Ok(receipt)) => {
                    debug!(
                        activity = %activity,
                        seq,
                        total_xp = receipt.total_xp,
                        "remote award confirmed"
                    );
                    store.apply_remote(seq, receipt);
                }
                Ok(Err(e)) => warn!(activity = %activity, error = %e, "remote award failed"),
                Err(_) => warn!(activity = %activity, ?timeout, "remote award timed out"),
            }
        });
    }

    /// Confirm a quest completion against the remote ledger.
    pub(crate) fn spawn_quest_upsert(&self, day_key: String, quest_id: String) {
        let Some(user) = self.gated_user("quest upsert") else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!(quest_id = %quest_id, "remote sync skipped (no async runtime)");
            return;
        };

        let remote = Arc::clone(&self.remote);
        let timeout = self.timeout;
        handle.spawn(async move {
            remote
                .log_event(&user, "quest_complete", json!({ "quest_id": &quest_id }))
                .await;

            match tokio::time::timeout(
                timeout,
                remote.upsert_quest(&user, &day_key, &quest_id, true),
            )
            .await
            {
                Ok(Ok(())) => debug!(quest_id = %quest_id, day_key = %day_key, "remote quest upsert ok"),
                Ok(Err(e)) => warn!(quest_id = %quest_id, error = %e, "remote quest upsert failed"),
                Err(_) => warn!(quest_id = %quest_id, ?timeout, "remote quest upsert timed out"),
            }
        });
    }
}
