//! Core domain types and traits for Solace.
//!
//! Everything that flows through the turn pipeline is defined here:
//! the user's message and its classification, the crisis detection
//! verdict, the plan, the composed reply, the critic verdict, and the
//! per-user memory records. The two trait seams that the rest of the
//! workspace plugs into also live here:
//!
//! - [`LanguageModel`] — the language-model backend (HTTP, scripted, ...)
//! - [`WellnessTool`] — the external tool collaborators
//!
//! The leaf stages (guardrail, classifier, planner, composer, critic,
//! memory) depend only on this crate, so each is unit-testable in
//! isolation. Only the pipeline crate has cross-stage knowledge.

pub mod backend;
pub mod context;
pub mod crisis;
pub mod error;
pub mod event;
pub mod intent;
pub mod language;
pub mod plan;
pub mod reply;
pub mod tool;
pub mod turn;

pub use backend::{BackendChunk, BackendRequest, BackendResponse, ChatMessage, ChatRole, LanguageModel};
pub use context::{ContextSummary, CrisisEvent, IntentFrequency, Preferences, WellnessTrend};
pub use crisis::{CrisisDetection, CrisisResponse, CrisisSeverity, CrisisType};
pub use error::{BackendError, Error, InputError, MemoryError, Result, ToolError};
pub use event::{DomainEvent, EventBus, Stage};
pub use intent::{Intent, IntentClassification, CONFIDENCE_FLOOR};
pub use language::Language;
pub use plan::{Horizon, Plan, Strategy, ToolInvocation, ToolName};
pub use reply::{ComposedReply, CriticCheck, CriticResult};
pub use tool::{ToolRegistry, ToolResult, WellnessTool};
pub use turn::{EmotionalTone, FinalResponse, ReplyChunk, TurnRecord};
