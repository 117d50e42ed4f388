//! Domain event system for decoupled observation of the pipeline.
//!
//! Events are published as stages run: receipt, crisis detections,
//! stage fallbacks, tool executions, completion. Observers (metrics,
//! audit sinks) subscribe without coupling to the pipeline. Crisis
//! events carry metadata only, never message content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::crisis::{CrisisSeverity, CrisisType};
use crate::intent::Intent;
use crate::plan::ToolName;

/// A pipeline stage, for fallback and timing events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    CrisisCheck,
    Classify,
    Plan,
    Dispatch,
    Compose,
    Critique,
    MemoryWrite,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::CrisisCheck => "crisis_check",
            Stage::Classify => "classify",
            Stage::Plan => "plan",
            Stage::Dispatch => "dispatch",
            Stage::Compose => "compose",
            Stage::Critique => "critique",
            Stage::MemoryWrite => "memory_write",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A message entered the pipeline
    TurnReceived {
        user_id: String,
        message_len: usize,
        timestamp: DateTime<Utc>,
    },

    /// The guardrail flagged a crisis (metadata only)
    CrisisDetected {
        severity: CrisisSeverity,
        crisis_type: Option<CrisisType>,
        confidence: f32,
        keyword_count: usize,
        message_len: usize,
        timestamp: DateTime<Utc>,
    },

    /// A stage failed or timed out and its local fallback was used
    StageFellBack {
        stage: Stage,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// A tool was dispatched
    ToolExecuted {
        tool: ToolName,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// The pipeline emitted a response
    TurnCompleted {
        user_id: String,
        intent: Intent,
        is_crisis: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub. Publishing
/// never fails: with no subscribers the event is simply dropped.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: DomainEvent) {
        let _ = self.sender.send(Arc::new(event));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
