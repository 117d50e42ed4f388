//! Language-model backend implementations for Solace.
//!
//! Two implementations of [`solace_core::LanguageModel`]:
//!
//! - [`OpenAiCompatBackend`]: any OpenAI-compatible chat-completions
//!   endpoint (OpenAI, OpenRouter, Ollama, vLLM, ...)
//! - [`ScriptedBackend`]: a queue of canned responses for tests and
//!   offline runs
//!
//! The pipeline never depends on a concrete backend; the wire format
//! here is an implementation detail behind the trait.

pub mod http;
pub mod scripted;

pub use http::OpenAiCompatBackend;
pub use scripted::ScriptedBackend;
