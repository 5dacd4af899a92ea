//! Character stats and the leveling rule.
//!
//! `(level, xp)` is a base-100 positional encoding of cumulative XP:
//! `cumulative = 100 * (level - 1) + xp`. Every mutation round-trips
//! through the cumulative form, so incremental awards and totals confirmed
//! by the server resolve through the same formula:
//!
//! ```text
//! level = total / 100 + 1
//! xp    = total % 100
//! ```
//!
//! After any mutation `0 <= xp < 100` and `level >= 1` hold.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-user aggregate stats shown in the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Cosmetic health gauge, 0-100. Not governed by the reward rules.
    pub hp: f32,
    /// Cosmetic mana gauge, 0-100. Not governed by the reward rules.
    pub mp: f32,
    /// Progress within the current level, always in `0..100`.
    pub xp: u32,
    /// Current level, at least 1.
    pub level: u32,
    /// Consecutive-day streak. No upper bound.
    pub streak: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            hp: 78.0,
            mp: 62.0,
            xp: 35,
            level: 7,
            streak: 1,
        }
    }
}

impl Stats {
    /// Cumulative XP across all levels.
    ///
    /// `(level, xp)` alone is not reversible to a lifetime total without
    /// this: the store never tracks a separate counter.
    pub fn cumulative_xp(&self) -> u64 {
        100 * (self.level.max(1) as u64 - 1) + self.xp as u64
    }

    /// Overwrite `xp` and `level` from a cumulative total.
    ///
    /// Used both for local awards and for totals confirmed by the remote
    /// ledger, which may move the encoding in either direction.
    pub fn set_cumulative(&mut self, total: u64) {
        self.xp = (total % 100) as u32;
        self.level = (total / 100 + 1) as u32;
    }

    /// Add an award to the cumulative total and re-derive `xp`/`level`.
    ///
    /// Returns the number of levels gained so callers can celebrate.
    pub fn apply_award(&mut self, amount: u32) -> u32 {
        let before = self.level;
        self.set_cumulative(self.cumulative_xp() + amount as u64);
        self.level - before
    }
}

/// Mood tint for presentation; does not affect the reward rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mood {
    Calm,
    #[default]
    Focused,
    Confident,
    Stressed,
    Tired,
}

impl Mood {
    /// Every mood, in picker order.
    pub const ALL: [Mood; 5] = [
        Mood::Calm,
        Mood::Focused,
        Mood::Confident,
        Mood::Stressed,
        Mood::Tired,
    ];

    /// Display name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Mood::Calm => "Calm",
            Mood::Focused => "Focused",
            Mood::Confident => "Confident",
            Mood::Stressed => "Stressed",
            Mood::Tired => "Tired",
        }
    }

    /// Parse a mood case-insensitively; `None` for unknown values.
    pub fn parse(s: &str) -> Option<Mood> {
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
