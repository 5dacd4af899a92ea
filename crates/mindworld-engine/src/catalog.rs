//! Reward catalog: activities and the daily quest table.
//!
//! Reward amounts are fixed constants, not a scaling curve. Every XP
//! grant goes through an [`Activity`] so call sites reference a catalog
//! entry instead of scattering bare literals.

use serde::{Deserialize, Serialize};

/// A reward-worthy activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Activity {
    /// Finished the onboarding flow
    Onboarding,
    /// Completed one daily quest
    DailyQuest,
    /// Marked a roadmap task done
    TaskComplete,
    /// Claimed a reward node
    RewardNode,
    /// Finished a hypnosis session
    HypnosisSession,
    /// Cleared every daily quest
    FullClear,
    /// Finished a focus session
    FocusSession,
}

impl Activity {
    /// Fixed XP reward for the activity.
    pub const fn reward(&self) -> u32 {
        match self {
            Activity::Onboarding => 5,
            Activity::DailyQuest => 10,
            Activity::TaskComplete => 15,
            Activity::RewardNode => 20,
            Activity::HypnosisSession => 25,
            Activity::FullClear => 25,
            Activity::FocusSession => 40,
        }
    }

    /// Stable label sent to the remote ledger and event log.
    pub const fn label(&self) -> &'static str {
        match self {
            Activity::Onboarding => "onboarding",
            Activity::DailyQuest => "quest",
            Activity::TaskComplete => "task",
            Activity::RewardNode => "reward",
            Activity::HypnosisSession => "hypnosis",
            Activity::FullClear => "full-clear",
            Activity::FocusSession => "focus",
        }
    }

    /// Human-facing name.
    pub const fn display_name(&self) -> &'static str {
        match self {
            Activity::Onboarding => "Onboarding",
            Activity::DailyQuest => "Daily Quest",
            Activity::TaskComplete => "Task Complete",
            Activity::RewardNode => "Reward",
            Activity::HypnosisSession => "Hypnosis Session",
            Activity::FullClear => "Full Clear",
            Activity::FocusSession => "Focus Session",
        }
    }
}

/// A daily quest definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyQuestDef {
    /// Stable quest identifier.
    pub id: &'static str,
    /// Label shown on the quest board.
    pub label: &'static str,
}

/// The daily quests, in board order.
pub const DAILY_QUESTS: [DailyQuestDef; 5] = [
    DailyQuestDef {
        id: "pick-focus",
        label: "Pick Today's Focus",
    },
    DailyQuestDef {
        id: "start-hypno",
        label: "Start 1 Hypno Session",
    },
    DailyQuestDef {
        id: "add-note",
        label: "Add One Note",
    },
    DailyQuestDef {
        id: "record-voice",
        label: "Record Voice Note",
    },
    DailyQuestDef {
        id: "open-analyze",
        label: "Open Analyze Tool",
    },
];

/// Look up a daily quest by id.
pub fn daily_quest(id: &str) -> Option<&'static DailyQuestDef> {
    DAILY_QUESTS.iter().find(|q| q.id == id)
}

/// Whether the id names one of the daily quests.
pub fn is_daily_quest(id: &str) -> bool {
    daily_quest(id).is_some()
}
