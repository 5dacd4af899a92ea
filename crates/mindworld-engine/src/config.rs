//! Engine configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Tunables for the progress engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bound on each remote reconciliation call. Elapsed calls are logged
    /// and dropped like any other remote failure.
    pub remote_timeout: Duration,
    /// Capacity of the progress event channel.
    pub event_capacity: usize,
    /// Where the profile snapshot is written. `None` keeps the profile in
    /// memory only (it still survives within the process).
    pub snapshot_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            remote_timeout: Duration::from_secs(10),
            event_capacity: 256,
            snapshot_path: None,
        }
    }
}

impl EngineConfig {
    /// Persist profile snapshots at the given path.
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Override the remote call timeout.
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }
}
