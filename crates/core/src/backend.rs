//! LanguageModel trait: the abstraction over the language-model backend.
//!
//! The pipeline talks to the backend only through this trait, so tests
//! script it and the HTTP implementation stays swappable. Every call
//! site wraps the future in its own `tokio::time::timeout`; a timeout
//! triggers an immediate stage-local fallback with no retry.
//!
//! Callers must parse responses defensively: classification and critic
//! prompts may return malformed JSON and must fall back without
//! throwing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// The role of a chat message sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single message in a backend request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// A request to the language-model backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendRequest {
    pub messages: Vec<ChatMessage>,

    /// 0.0 = deterministic, 1.0 = creative.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

impl BackendRequest {
    /// A system + user prompt pair with the given temperature.
    pub fn prompt(system: impl Into<String>, user: impl Into<String>, temperature: f32) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature,
            top_p: None,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }
}

/// A complete (non-streaming) backend response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendResponse {
    pub content: String,
}

/// A single chunk in a streaming response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendChunk {
    #[serde(default)]
    pub content: Option<String>,

    /// Whether this is the final chunk.
    #[serde(default)]
    pub done: bool,
}

/// The language-model backend seam.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// A human-readable name for this backend (e.g. "openai_compat", "scripted").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: BackendRequest) -> std::result::Result<BackendResponse, BackendError>;

    /// Send a request and get a stream of chunks.
    ///
    /// Default implementation calls `complete()` and wraps the result as
    /// a single terminal chunk.
    async fn stream(
        &self,
        request: BackendRequest,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<BackendChunk, BackendError>>,
        BackendError,
    > {
        let response = self.complete(request).await?;
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        let _ = tx
            .send(Ok(BackendChunk { content: Some(response.content), done: true }))
            .await;
        Ok(rx)
    }
}
