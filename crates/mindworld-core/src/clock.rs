//! Time abstraction and the day-boundary service.
//!
//! `Clock` allows tests to control time, enabling deterministic testing
//! of time-dependent behavior. [`DayBoundary`] is the single authority
//! for what "today" means: the quest set's daily scope and the daily
//! percent cutoff both consult it instead of comparing date strings at
//! each call site.
//!
//! The engine never detects rollover on its own; the embedding app calls
//! `ProgressStore::reset_daily` when the boundary service says the day
//! changed.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, NaiveTime, Utc};

/// Time abstraction for testability
pub trait Clock: Send + Sync {
    /// Get the current UTC datetime
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Real clock implementation using system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for deterministic tests.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl FixedClock {
    /// Create a clock frozen at the given instant.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(now)),
        }
    }

    /// Move the clock to a new instant.
    pub fn set(&self, now: DateTime<Utc>) {
        *self
            .now
            .write()
            .unwrap_or_else(PoisonError::into_inner) = now;
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Day-boundary service.
///
/// Calendar days are UTC. One instance is shared by the progress store
/// (quest-set scoping) and the roadmap calculator (done-today cutoff) so
/// they can never disagree about the boundary.
#[derive(Clone)]
pub struct DayBoundary {
    clock: Arc<dyn Clock>,
}

impl DayBoundary {
    /// Create a boundary service over the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Boundary service over the system clock.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// The current instant, per the underlying clock.
    pub fn now_utc(&self) -> DateTime<Utc> {
        self.clock.now_utc()
    }

    /// Midnight at the start of the current day.
    pub fn start_of_today(&self) -> DateTime<Utc> {
        self.clock
            .now_utc()
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc()
    }

    /// Calendar key for the current day, `YYYY-MM-DD`.
    ///
    /// Used to scope the quest completion set and to key remote quest
    /// upserts.
    pub fn day_key(&self) -> String {
        self.clock.now_utc().format("%Y-%m-%d").to_string()
    }

    /// Whether two instants fall on the same calendar day.
    pub fn same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        a.date_naive() == b.date_naive()
    }

    /// Whether the instant falls on the current day.
    pub fn is_today(&self, at: DateTime<Utc>) -> bool {
        self.same_day(at, self.clock.now_utc())
    }
}

impl std::fmt::Debug for DayBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DayBoundary").finish_non_exhaustive()
    }
}
