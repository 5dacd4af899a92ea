//! Error types for MindWorld core

use thiserror::Error;

/// Top-level error type for MindWorld
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Errors from the remote ledger and task source
///
/// These never reach callers of the store's mutation API; they are logged
/// by the reconciliation layer and dropped. Implementations of the remote
/// traits surface them so embedders can optionally observe failures.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// No authenticated identity; all remote calls are gated off
    #[error("no authenticated identity")]
    NoIdentity,

    /// A named remote procedure failed
    #[error("remote procedure `{procedure}` failed: {message}")]
    Procedure { procedure: String, message: String },

    /// The bounded call deadline elapsed
    #[error("remote call timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Payload could not be encoded or decoded
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The change-notification channel closed
    #[error("change channel closed")]
    ChannelClosed,
}

impl RemoteError {
    /// Shorthand for a failed named procedure.
    pub fn procedure(procedure: impl Into<String>, message: impl ToString) -> Self {
        RemoteError::Procedure {
            procedure: procedure.into(),
            message: message.to_string(),
        }
    }
}

/// Errors from profile snapshot persistence
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result alias for fallible core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Result alias for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Result alias for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;
