//! Convenient imports for the progress engine.
//!
//! ```ignore
//! use mindworld_engine::prelude::*;
//! ```

pub use crate::{
    // The store and its collaborators
    ProgressStore,
    EngineConfig,
    // Catalog
    Activity,
    DAILY_QUESTS,
    // Events
    EventBus,
    ProgressEvent,
    // Domain types
    Mood,
    Stats,
    Note,
    ProfileSnapshot,
    // Aggregation
    RoadmapProgress,
    daily_percent,
    // Persistence
    JsonSnapshots,
    MemorySnapshots,
    SnapshotStore,
};

pub use mindworld_core::{
    Anonymous, AwardReceipt, Clock, DayBoundary, IdentityProvider, RemoteLedger, StaticIdentity,
    SystemClock, TaskRecord, TaskSource, TaskStatus, UserId,
};
