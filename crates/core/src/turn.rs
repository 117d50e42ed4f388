//! Turn records and the caller-facing response types.
//!
//! A turn is one user message and its resulting system response. The
//! [`TurnRecord`] is the immutable, append-only unit the memory manager
//! owns; [`FinalResponse`] and [`ReplyChunk`] are what callers of the
//! pipeline see.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crisis::CrisisSeverity;
use crate::intent::Intent;
use crate::language::Language;
use crate::plan::ToolName;

/// Coarse emotional read of a user message, derived by the pipeline
/// from the guardrail and classifier outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalTone {
    #[default]
    Neutral,
    Upbeat,
    Anxious,
    Low,
    Distressed,
}

/// One completed turn. Immutable once written; the memory manager keeps
/// an append-only, FIFO-capped log of these per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Unique turn id. Assigned by the pipeline at receipt so that
    /// memory writes are idempotent under concurrent retries.
    pub id: String,

    pub user_id: String,

    pub timestamp: DateTime<Utc>,

    pub user_message: String,

    pub language: Language,

    pub intent: Intent,

    pub confidence: f32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools_used: Vec<ToolName>,

    /// The reply that was actually emitted.
    pub response: String,

    #[serde(default)]
    pub emotional_tone: EmotionalTone,

    /// Self-reported or inferred stress, 0..=10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_level: Option<f32>,
}

impl TurnRecord {
    /// Generate a fresh turn id.
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }
}

/// What `submit_turn` hands back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResponse {
    pub content: String,

    pub intent: Intent,

    pub is_crisis: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crisis_severity: Option<CrisisSeverity>,

    pub confidence: f32,

    pub language: Language,

    pub timestamp: DateTime<Utc>,
}

/// One chunk of a streamed reply. The stream always ends with a chunk
/// whose `done` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyChunk {
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub done: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReplyChunk {
    pub fn content(content: impl Into<String>) -> Self {
        Self { content: content.into(), done: false, error: None }
    }

    pub fn done() -> Self {
        Self { content: String::new(), done: true, error: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { content: String::new(), done: true, error: Some(message.into()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_ids_are_unique() {
        assert_ne!(TurnRecord::new_id(), TurnRecord::new_id());
    }

    #[test]
    fn final_response_serializes_without_empty_severity() {
        let r = FinalResponse {
            content: "hello".into(),
            intent: Intent::SmallTalk,
            is_crisis: false,
            crisis_severity: None,
            confidence: 0.8,
            language: Language::En,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&r).unwrap();
        assert!(!json.contains("crisis_severity"));
    }

    #[test]
    fn terminal_chunk_is_done() {
        assert!(ReplyChunk::done().done);
        let err = ReplyChunk::error("boom");
        assert!(err.done);
        assert_eq!(err.error.as_deref(), Some("boom"));
    }
}
