//! Profile snapshot persistence.
//!
//! The profile is a single small value, so persistence is a whole-snapshot
//! JSON write on every mutation, last-writer-wins. Writes go to a sibling
//! temp file first and are renamed into place, so a crash mid-write leaves
//! the previous snapshot intact.
//!
//! Persistence failures never reach the mutation caller; the store logs
//! them and carries on with its in-memory state.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use mindworld_core::error::SnapshotResult;

use crate::stats::{Mood, Stats};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A short note captured during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Serialized profile state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    /// Snapshot format version.
    pub version: u32,
    pub stats: Stats,
    pub mood: Mood,
    /// Calendar day (`YYYY-MM-DD`) the quest set belongs to. Snapshots
    /// from a previous day load with an empty quest set.
    pub quest_day: String,
    pub quests: BTreeMap<String, bool>,
    pub position: (f32, f32),
    pub notes: Vec<Note>,
    pub unlocked: BTreeSet<String>,
}

/// Persistence seam for profile snapshots.
///
/// Synchronous on purpose: the store persists inside its synchronous
/// mutation path, and the profile is small enough that a blocking write
/// is cheaper than handing it to a background task.
pub trait SnapshotStore: Send + Sync {
    /// Load the last snapshot, if one exists.
    fn load(&self) -> SnapshotResult<Option<ProfileSnapshot>>;

    /// Persist the snapshot, replacing any previous one.
    fn save(&self, snapshot: &ProfileSnapshot) -> SnapshotResult<()>;
}

/// File-backed snapshot store.
#[derive(Debug, Clone)]
pub struct JsonSnapshots {
    path: PathBuf,
}

impl JsonSnapshots {
    /// Store snapshots at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot path.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonSnapshots {
    fn load(&self) -> SnapshotResult<Option<ProfileSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        let snapshot = serde_json::from_str(&raw)?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &ProfileSnapshot) -> SnapshotResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.tmp_path();
        fs::write(&tmp, serde_json::to_vec_pretty(snapshot)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "profile snapshot written");
        Ok(())
    }
}

/// In-memory snapshot store for tests and snapshot-less embeddings.
#[derive(Debug, Default)]
pub struct MemorySnapshots {
    slot: Mutex<Option<ProfileSnapshot>>,
}

impl MemorySnapshots {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshots {
    fn load(&self) -> SnapshotResult<Option<ProfileSnapshot>> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, snapshot: &ProfileSnapshot) -> SnapshotResult<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        Ok(())
    }
}
