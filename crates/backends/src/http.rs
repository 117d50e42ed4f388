//! OpenAI-compatible backend implementation.
//!
//! Works with any endpoint exposing `/v1/chat/completions`: OpenAI,
//! OpenRouter, Ollama, vLLM, Together AI. Supports non-streaming and
//! streaming (SSE) completions. No tool-calling surface: Solace tools
//! are dispatched by the planner, not by the model.

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use solace_core::backend::{BackendChunk, BackendRequest, BackendResponse, ChatRole, LanguageModel};
use solace_core::error::BackendError;
use tracing::{debug, trace, warn};

/// An OpenAI-compatible language-model backend.
pub struct OpenAiCompatBackend {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCompatBackend {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap_or_default();

        Self {
            name: "openai_compat".into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }

    fn body(&self, request: &BackendRequest, stream: bool) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = request
            .messages
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": match m.role {
                        ChatRole::System => "system",
                        ChatRole::User => "user",
                        ChatRole::Assistant => "assistant",
                    },
                    "content": m.content,
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": request.temperature,
            "stream": stream,
        });
        if let Some(top_p) = request.top_p {
            body["top_p"] = serde_json::json!(top_p);
        }
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        body
    }

    async fn post(
        &self,
        body: &serde_json::Value,
        accept_sse: bool,
    ) -> std::result::Result<reqwest::Response, BackendError> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut req = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        if accept_sse {
            req = req.header("Accept", "text/event-stream");
        }

        let response = req
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Backend returned error");
            return Err(BackendError::Api { status_code: status, message: error_body });
        }
        Ok(response)
    }
}

#[async_trait]
impl LanguageModel for OpenAiCompatBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: BackendRequest) -> std::result::Result<BackendResponse, BackendError> {
        debug!(backend = %self.name, model = %self.model, "Sending completion request");

        let body = self.body(&request, false);
        let response = self.post(&body, false).await?;

        let api_response: ApiResponse = response.json().await.map_err(|e| BackendError::Api {
            status_code: 200,
            message: format!("Failed to parse response: {e}"),
        })?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Api {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        Ok(BackendResponse {
            content: choice.message.content.unwrap_or_default(),
        })
    }

    async fn stream(
        &self,
        request: BackendRequest,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<BackendChunk, BackendError>>,
        BackendError,
    > {
        debug!(backend = %self.name, model = %self.model, "Sending streaming request");

        let body = self.body(&request, true);
        let response = self.post(&body, true).await?;

        let (tx, rx) = tokio::sync::mpsc::channel(64);
        let backend_name = self.name.clone();

        // Read the SSE byte stream and forward content deltas.
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx.send(Err(BackendError::StreamInterrupted(e.to_string()))).await;
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim_end_matches('\r').to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    if line.is_empty() || line.starts_with(':') {
                        continue;
                    }

                    if let Some(data) = line.strip_prefix("data: ") {
                        let data = data.trim();

                        if data == "[DONE]" {
                            let _ = tx.send(Ok(BackendChunk { content: None, done: true })).await;
                            return;
                        }

                        match serde_json::from_str::<StreamResponse>(data) {
                            Ok(stream_resp) => {
                                if let Some(choice) = stream_resp.choices.first() {
                                    let content = choice.delta.content.clone();
                                    if content.as_ref().is_some_and(|c| !c.is_empty()) {
                                        let chunk = BackendChunk { content, done: false };
                                        if tx.send(Ok(chunk)).await.is_err() {
                                            return; // receiver dropped
                                        }
                                    }
                                }
                            }
                            Err(e) => {
                                trace!(
                                    backend = %backend_name,
                                    error = %e,
                                    "Ignoring unparseable SSE chunk"
                                );
                            }
                        }
                    }
                }
            }

            // Stream ended without [DONE]; still terminate cleanly.
            let _ = tx.send(Ok(BackendChunk { content: None, done: true })).await;
        });

        Ok(rx)
    }
}

// --- Wire format types ---

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Deserialize)]
struct ApiMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamResponse {
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use solace_core::backend::ChatMessage;

    #[test]
    fn body_includes_model_and_messages() {
        let backend = OpenAiCompatBackend::new("https://api.example.com/v1", "key", "test-model");
        let request = BackendRequest {
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            temperature: 0.2,
            top_p: None,
            max_tokens: Some(128),
        };
        let body = backend.body(&request, false);
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["max_tokens"], 128);
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let backend = OpenAiCompatBackend::new("https://api.example.com/v1/", "key", "m");
        assert_eq!(backend.base_url, "https://api.example.com/v1");
    }

    #[test]
    fn stream_chunk_parses() {
        let data = r#"{"choices":[{"delta":{"content":"hel"}}]}"#;
        let parsed: StreamResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.choices[0].delta.content.as_deref(), Some("hel"));
    }
}
