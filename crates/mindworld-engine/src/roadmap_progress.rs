//! Daily roadmap progress.
//!
//! `percent = round(100 * done_today / max(1, total))`, where `done_today`
//! counts tasks completed at or after the day boundary and `total` counts
//! every task in the roadmap regardless of status.
//!
//! Every trigger re-runs the full aggregation over the fetched task list;
//! incremental patching drifts when updates arrive out of order. A failed
//! query keeps the last-known percent in place instead of flashing back
//! to zero.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use mindworld_core::{DayBoundary, RoadmapId, TaskRecord, TaskSource, UserId};

/// Pure aggregation over task rows.
///
/// The denominator is floored at 1 so an empty roadmap reports 0% rather
/// than failing; the result cannot leave `[0, 100]` since done tasks are
/// a subset of all tasks.
pub fn daily_percent(tasks: &[TaskRecord], day_start: DateTime<Utc>) -> u8 {
    let total = tasks.len().max(1);
    let done_today = tasks.iter().filter(|t| t.done_since(day_start)).count();
    ((done_today as f64 / total as f64) * 100.0).round() as u8
}

/// Live percent-complete-today for one (user, roadmap) pair.
pub struct RoadmapProgress {
    user: Option<UserId>,
    roadmap: Option<RoadmapId>,
    tasks: Arc<dyn TaskSource>,
    days: DayBoundary,
    percent_tx: watch::Sender<u8>,
}

impl RoadmapProgress {
    /// Create a calculator. With no user or no roadmap the percent is
    /// defined as 0 and no queries are ever made.
    pub fn new(
        tasks: Arc<dyn TaskSource>,
        days: DayBoundary,
        user: Option<UserId>,
        roadmap: Option<RoadmapId>,
    ) -> Self {
        let (percent_tx, _) = watch::channel(0);
        Self {
            user,
            roadmap,
            tasks,
            days,
            percent_tx,
        }
    }

    /// Latest computed percent.
    pub fn percent(&self) -> u8 {
        *self.percent_tx.borrow()
    }

    /// Subscribe to percent updates.
    pub fn subscribe(&self) -> watch::Receiver<u8> {
        self.percent_tx.subscribe()
    }

    /// Re-run the full aggregation and return the resulting percent.
    pub async fn refresh(&self) -> u8 {
        let (Some(user), Some(roadmap)) = (&self.user, &self.roadmap) else {
            self.percent_tx.send_replace(0);
            return 0;
        };

        match self.tasks.fetch_tasks(user, roadmap).await {
            Ok(rows) => {
                let percent = daily_percent(&rows, self.days.start_of_today());
                debug!(roadmap = %roadmap, percent, tasks = rows.len(), "daily progress refreshed");
                self.percent_tx.send_replace(percent);
                percent
            }
            Err(e) => {
                warn!(roadmap = %roadmap, error = %e, "task query failed; keeping last-known percent");
                self.percent()
            }
        }
    }

    /// Spawn the change-notification listener.
    ///
    /// Any create/update/delete of a task belonging to this calculator's
    /// (user, roadmap) pair triggers a full refresh. The task ends when
    /// the source's change channel closes.
    pub fn watch(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        // subscribe before spawning so no change slips past the handoff
        let mut rx = self.tasks.changes();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(change) => {
                        let (Some(user), Some(roadmap)) = (&self.user, &self.roadmap) else {
                            continue;
                        };
                        if change.touches(user, roadmap) {
                            self.refresh().await;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        debug!(missed, "task change stream lagged; refreshing");
                        self.refresh().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}
