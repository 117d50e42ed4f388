//! Crisis guardrail engine: the safety-critical branch of the pipeline.
//!
//! Two detectors feed one verdict: a language-scoped weighted keyword
//! scan (always runs, authoritative baseline) and an optional
//! model-based check (invoked only when the keyword scan found
//! something, and never allowed to block or fail the turn). A positive
//! detection routes the turn onto the crisis branch, which bypasses
//! the composer and critic entirely: no downstream failure can drop or
//! soften a detected crisis.
//!
//! Detections are audit-logged with metadata only (severity, type,
//! confidence, matched keywords, message length). Raw message content
//! never reaches the audit log.

pub mod detector;
pub mod lexicon;
pub mod response;

pub use detector::CrisisDetector;
pub use lexicon::{KeywordWeight, Lexicon, LexiconEntry, Lexicons};
pub use response::{CrisisResponder, HelplineDirectory};
