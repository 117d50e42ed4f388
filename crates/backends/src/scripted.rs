//! Scripted backend: a queue of canned responses.
//!
//! Used by unit and integration tests to script exact backend behavior
//! (including failures and slow responses), and by the CLI's offline
//! mode. Each `complete` call pops the next scripted outcome; when the
//! queue runs dry the default response is used, or an error if none is
//! configured.

use async_trait::async_trait;
use solace_core::backend::{BackendRequest, BackendResponse, LanguageModel};
use solace_core::error::BackendError;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// A backend that replays a scripted sequence of outcomes.
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<String, BackendError>>>,
    default_response: Option<String>,
    delay: Option<Duration>,
    call_count: Mutex<usize>,
}

impl ScriptedBackend {
    /// A backend that returns these responses in order.
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().map(|r| Ok(r.to_string())).collect()),
            default_response: None,
            delay: None,
            call_count: Mutex::new(0),
        }
    }

    /// A backend scripted with explicit outcomes, including failures.
    pub fn with_outcomes(outcomes: Vec<Result<String, BackendError>>) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            default_response: None,
            delay: None,
            call_count: Mutex::new(0),
        }
    }

    /// A backend that always returns the same response.
    pub fn always(response: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_response: Some(response.to_string()),
            delay: None,
            call_count: Mutex::new(0),
        }
    }

    /// A backend that always fails with the given error.
    pub fn failing(error: BackendError) -> Self {
        Self::with_outcomes(vec![Err(error)]).repeating_last()
    }

    /// Keep replaying the last scripted outcome instead of running dry.
    /// A trailing error needs no bookkeeping: `complete` replays a lone
    /// queued error forever.
    pub fn repeating_last(mut self) -> Self {
        let last = self
            .script
            .get_mut()
            .expect("script lock poisoned")
            .back()
            .cloned();
        if let Some(Ok(text)) = last {
            self.default_response = Some(text);
        }
        self
    }

    /// Sleep this long before answering (for timeout tests).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many `complete` calls this backend has served.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().expect("counter lock poisoned")
    }
}

#[async_trait]
impl LanguageModel for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _request: BackendRequest) -> Result<BackendResponse, BackendError> {
        *self.call_count.lock().expect("counter lock poisoned") += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = {
            let mut script = self.script.lock().expect("script lock poisoned");
            // A single scripted error replays forever; successes are consumed.
            let replay_error = script.len() == 1 && matches!(script.front(), Some(Err(_)));
            if replay_error {
                script.front().cloned()
            } else {
                script.pop_front()
            }
        };

        match next {
            Some(outcome) => outcome.map(|content| BackendResponse { content }),
            None => match &self.default_response {
                Some(content) => Ok(BackendResponse { content: content.clone() }),
                None => Err(BackendError::NotConfigured("scripted backend exhausted".into())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solace_core::backend::BackendRequest;

    fn request() -> BackendRequest {
        BackendRequest::prompt("sys", "user", 0.2)
    }

    #[tokio::test]
    async fn returns_responses_in_order() {
        let backend = ScriptedBackend::new(vec!["first", "second"]);
        assert_eq!(backend.complete(request()).await.unwrap().content, "first");
        assert_eq!(backend.complete(request()).await.unwrap().content, "second");
        assert!(backend.complete(request()).await.is_err());
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test]
    async fn always_repeats() {
        let backend = ScriptedBackend::always("steady");
        for _ in 0..3 {
            assert_eq!(backend.complete(request()).await.unwrap().content, "steady");
        }
    }

    #[tokio::test]
    async fn failing_repeats_error() {
        let backend = ScriptedBackend::failing(BackendError::Timeout { timeout_ms: 10 });
        for _ in 0..2 {
            let err = backend.complete(request()).await.unwrap_err();
            assert!(matches!(err, BackendError::Timeout { .. }));
        }
    }

    #[tokio::test]
    async fn scripted_failure_then_success() {
        let backend = ScriptedBackend::with_outcomes(vec![
            Err(BackendError::Network("conn refused".into())),
            Ok("recovered".into()),
        ]);
        assert!(backend.complete(request()).await.is_err());
        assert_eq!(backend.complete(request()).await.unwrap().content, "recovered");
    }

    #[tokio::test]
    async fn delay_is_observable() {
        tokio::time::pause();
        let backend = ScriptedBackend::always("slow").with_delay(Duration::from_secs(5));
        let fut = backend.complete(request());
        let timed = tokio::time::timeout(Duration::from_secs(1), fut);
        assert!(timed.await.is_err());
    }
}
