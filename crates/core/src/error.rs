//! Error types for the Solace domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Each bounded context
//! has its own error variant. The taxonomy mirrors the recovery policy:
//!
//! - [`InputError`] is the only error that surfaces to the caller
//! - [`BackendError`] is recovered locally with a stage-specific fallback
//! - [`ToolError`] is recovered by omitting the tool output
//! - [`MemoryError`] is logged and never aborts a turn

use thiserror::Error;

/// The top-level error type for all Solace operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Malformed requests (surfaced to the caller) ---
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    // --- Language-model backend errors ---
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// A malformed request. The only error kind the pipeline lets cross
/// its boundary; everything else degrades to a fallback reply.
#[derive(Debug, Clone, Error)]
pub enum InputError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("Message too long: {len} chars (max {max})")]
    MessageTooLong { len: usize, max: usize },

    #[error("User id is blank")]
    BlankUserId,
}

/// Failures from the language-model backend.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Malformed model output: {0}")]
    Parse(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures from a tool collaborator.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool not registered: {0}")]
    NotRegistered(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_ms}ms")]
    Timeout { tool_name: String, timeout_ms: u64 },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

/// Failures from the context memory manager.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Duplicate turn id: {0}")]
    DuplicateTurn(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_error_displays_correctly() {
        let err = Error::Input(InputError::MessageTooLong { len: 9000, max: 4000 });
        assert!(err.to_string().contains("9000"));
        assert!(err.to_string().contains("4000"));
    }

    #[test]
    fn backend_timeout_displays_correctly() {
        let err = Error::Backend(BackendError::Timeout { timeout_ms: 1500 });
        assert!(err.to_string().contains("1500"));
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = Error::Tool(ToolError::ExecutionFailed {
            tool_name: "fetch_checkins".into(),
            reason: "store unavailable".into(),
        });
        assert!(err.to_string().contains("fetch_checkins"));
        assert!(err.to_string().contains("store unavailable"));
    }
}
