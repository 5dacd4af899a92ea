//! Typed progress events.
//!
//! The store signals UI feedback (chimes, sparkles, HUD refreshes)
//! through a broadcast channel of typed events. Payload shapes are
//! checked at compile time; there are no string-keyed ad hoc events to
//! misspell.
//!
//! Emission never blocks and never fails: events sent while nobody is
//! subscribed are simply dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::stats::Mood;

/// Events emitted by the progress store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProgressEvent {
    /// XP was awarded locally. Emitted on every award, even zero-value
    /// ones, so feedback effects fire consistently.
    XpAwarded {
        activity: String,
        amount: u32,
        xp: u32,
        level: u32,
        leveled_up: bool,
    },
    /// A daily quest was marked complete for the first time today.
    QuestCompleted { quest_id: String },
    /// The consecutive-day streak changed.
    StreakChanged { streak: u32 },
    /// The user set a new mood.
    MoodChanged { mood: Mood },
    /// The daily quest set was cleared for a new day.
    QuestsReset { day_key: String },
    /// Server-confirmed totals were applied over local optimistic state.
    Reconciled {
        total_xp: u64,
        xp: u32,
        level: u32,
        streak: Option<u32>,
    },
    /// A note was appended.
    NoteAdded { at: DateTime<Utc> },
    /// A content id was unlocked.
    ContentUnlocked { content_id: String },
    /// The avatar moved.
    PositionChanged { x: f32, y: f32 },
}

/// Broadcast channel for progress events.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ProgressEvent>,
}

impl EventBus {
    /// Create a bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to all subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all current subscribers.
    pub fn emit(&self, event: ProgressEvent) {
        trace!(?event, "progress event");
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.emit(ProgressEvent::StreakChanged { streak: 3 });

        assert_eq!(
            rx.recv().await.unwrap(),
            ProgressEvent::StreakChanged { streak: 3 }
        );
    }

    #[test]
    fn emit_without_subscribers_is_a_no_op() {
        let bus = EventBus::new(8);
        bus.emit(ProgressEvent::PositionChanged { x: 1.0, y: 2.0 });
    }

    #[tokio::test]
    async fn each_subscriber_sees_every_event() {
        let bus = EventBus::new(8);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.emit(ProgressEvent::ContentUnlocked {
            content_id: "focus-25".to_string(),
        });

        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }
}
