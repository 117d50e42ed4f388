//! The derived per-user context summary.
//!
//! Owned by the context memory manager. Recomputed fully on cold start,
//! updated incrementally on each new turn, and treated as stale after
//! one hour.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crisis::{CrisisSeverity, CrisisType};
use crate::intent::Intent;
use crate::language::Language;

/// Direction of the user's recent wellness scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WellnessTrend {
    Improving,
    #[default]
    Stable,
    Declining,
}

/// An intent with its occurrence count in the retention window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentFrequency {
    pub intent: Intent,
    pub count: u32,
}

/// One past crisis detection, kept in the summary's crisis history.
/// Carries metadata only, never message content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrisisEvent {
    pub severity: CrisisSeverity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crisis_type: Option<CrisisType>,

    pub at: DateTime<Utc>,
}

/// Lightweight derived preferences used by the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    /// Modal language of the user's recent turns.
    pub preferred_language: Language,

    /// True when the user's median message length suggests they want
    /// short replies.
    pub prefers_brief: bool,
}

/// The rolling per-user summary derived from the turn log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSummary {
    /// At most 5 entries, sorted by count descending.
    pub recent_intents: Vec<IntentFrequency>,

    pub wellness_trend: WellnessTrend,

    /// At most 20 entries, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub crisis_history: Vec<CrisisEvent>,

    #[serde(default)]
    pub preferences: Preferences,

    pub last_updated: DateTime<Utc>,
}

impl ContextSummary {
    /// Maximum entries in `recent_intents`.
    pub const MAX_RECENT_INTENTS: usize = 5;

    /// Maximum entries in `crisis_history`.
    pub const MAX_CRISIS_HISTORY: usize = 20;

    /// An empty summary stamped now.
    pub fn empty() -> Self {
        Self {
            recent_intents: Vec::new(),
            wellness_trend: WellnessTrend::Stable,
            crisis_history: Vec::new(),
            preferences: Preferences::default(),
            last_updated: Utc::now(),
        }
    }

    /// Whether this summary is older than the given staleness window.
    pub fn is_stale(&self, now: DateTime<Utc>, staleness: chrono::Duration) -> bool {
        now - self.last_updated > staleness
    }

    /// The most frequent recent intent, if any.
    pub fn dominant_intent(&self) -> Option<Intent> {
        self.recent_intents.first().map(|f| f.intent)
    }
}
