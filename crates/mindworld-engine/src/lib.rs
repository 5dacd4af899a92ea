//! # MindWorld Engine
//!
//! Progress & rewards engine for MindWorld - XP accrual, leveling,
//! streaks, daily quests, and roadmap progress, with a local-first /
//! remote-confirm consistency model.
//!
//! The engine holds client-visible progress in a [`ProgressStore`]:
//! every mutation applies its rule synchronously, persists a snapshot,
//! and emits a typed [`ProgressEvent`]. When an identity is present,
//! each award is then confirmed against the remote authoritative ledger
//! in the background, and the confirmed totals overwrite the local
//! derived fields. [`RoadmapProgress`] computes percent-complete-today
//! over the external task rows and stays fresh via change notifications.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use mindworld_engine::prelude::*;
//!
//! // One store per profile; collaborators are injected
//! let store = ProgressStore::new(
//!     EngineConfig::default().with_snapshot_path("~/.mindworld/profile.json"),
//!     identity,
//!     ledger,
//! );
//!
//! // Local effect is immediate; remote confirmation is fire-and-forget
//! store.award(Activity::FocusSession, serde_json::json!({ "node": "focus-25" }));
//! store.complete_quest("start-hypno");
//! ```

// Progress rules and state
pub mod stats;
pub mod catalog;
pub mod store;

// Remote confirmation
pub mod reconcile;

// Daily aggregation
pub mod roadmap_progress;

// Supporting pieces
pub mod config;
pub mod event;
pub mod snapshot;

// Prelude
pub mod prelude;

// Re-export main types at crate root
pub use catalog::{Activity, DAILY_QUESTS, DailyQuestDef, daily_quest, is_daily_quest};
pub use config::EngineConfig;
pub use event::{EventBus, ProgressEvent};
pub use roadmap_progress::{RoadmapProgress, daily_percent};
pub use snapshot::{
    JsonSnapshots, MemorySnapshots, Note, ProfileSnapshot, SNAPSHOT_VERSION, SnapshotStore,
};
pub use stats::{Mood, Stats};
pub use store::ProgressStore;
