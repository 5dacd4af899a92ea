//! # MindWorld Core
//!
//! Core traits, types, and errors for the MindWorld progress engine.
//!
//! This crate provides the foundational abstractions that let the same
//! progress rules run against a real backend, an in-memory mock (for
//! testing), or no backend at all (signed-out local play).
//!
//! ## Key Traits
//!
//! - [`IdentityProvider`]: Access to the current authenticated user, gating all remote sync
//! - [`RemoteLedger`]: The authoritative award / quest-upsert / event-log procedures
//! - [`TaskSource`]: Read access to the task rows behind daily roadmap progress
//! - [`Clock`]: Time abstraction for testability
//!
//! ## Key Types
//!
//! - [`UserId`]: Stable identifier for an authenticated user
//! - [`AwardReceipt`]: Authoritative totals returned by the award procedure
//! - [`TaskRecord`] / [`TaskChange`]: The task read model and its change notifications
//! - [`DayBoundary`]: The single authority for where "today" starts

pub mod error;
pub mod identity;
pub mod clock;
pub mod task;
pub mod remote;
pub mod mock;

// Re-export main types
pub use error::*;
pub use identity::*;
pub use clock::*;
pub use task::*;
pub use remote::*;
pub use mock::*;
