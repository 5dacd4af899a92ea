//! Task and roadmap read model.
//!
//! Tasks are owned by the remote store - the engine never creates or
//! mutates them. It reads them to compute daily roadmap progress and
//! listens to change notifications to know when to recompute.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::UserId;

/// Identifier for a task row.
pub type TaskId = String;

/// Identifier for a roadmap.
pub type RoadmapId = String;

/// Lifecycle status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    Doing,
    Done,
}

impl TaskStatus {
    /// Stable lowercase form, matching the remote store's column values.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
        }
    }
}

/// Roadmap status; at most one roadmap is active per user.
///
/// The single-active invariant is enforced by the remote store, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadmapStatus {
    Active,
    Paused,
}

/// A task row as read from the remote store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub status: TaskStatus,
    /// Set when the task transitioned to done, cleared otherwise.
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// Whether this task was completed at or after the cutoff.
    pub fn done_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.status == TaskStatus::Done
            && self.completed_at.is_some_and(|at| at >= cutoff)
    }
}

/// Kind of change delivered by the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskChangeKind {
    Created,
    Updated,
    Deleted,
}

/// A task change notification scoped to a (user, roadmap) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskChange {
    pub kind: TaskChangeKind,
    pub user: UserId,
    pub roadmap: RoadmapId,
    pub task: TaskRecord,
}

impl TaskChange {
    /// Whether the change belongs to the given (user, roadmap) pair.
    pub fn touches(&self, user: &UserId, roadmap: &RoadmapId) -> bool {
        &self.user == user && &self.roadmap == roadmap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(status: TaskStatus, completed_at: Option<DateTime<Utc>>) -> TaskRecord {
        TaskRecord {
            id: "t1".to_string(),
            status,
            completed_at,
        }
    }

    #[test]
    fn done_since_requires_done_status() {
        let cutoff = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();
        let later = cutoff + chrono::Duration::hours(5);

        assert!(task(TaskStatus::Done, Some(later)).done_since(cutoff));
        assert!(!task(TaskStatus::Doing, Some(later)).done_since(cutoff));
    }

    #[test]
    fn done_since_requires_timestamp_at_or_after_cutoff() {
        let cutoff = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();
        let before = cutoff - chrono::Duration::seconds(1);

        assert!(task(TaskStatus::Done, Some(cutoff)).done_since(cutoff));
        assert!(!task(TaskStatus::Done, Some(before)).done_since(cutoff));
        assert!(!task(TaskStatus::Done, None).done_since(cutoff));
    }

    #[test]
    fn change_scoping_matches_both_user_and_roadmap() {
        let change = TaskChange {
            kind: TaskChangeKind::Updated,
            user: UserId::new("u1"),
            roadmap: "r1".to_string(),
            task: task(TaskStatus::Done, None),
        };

        assert!(change.touches(&UserId::new("u1"), &"r1".to_string()));
        assert!(!change.touches(&UserId::new("u2"), &"r1".to_string()));
        assert!(!change.touches(&UserId::new("u1"), &"r2".to_string()));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Doing).unwrap(),
            "\"doing\""
        );
        assert_eq!(TaskStatus::Done.as_str(), "done");
    }
}
