//! Intent classification with caching and a conservative fallback.
//!
//! Classification asks the language-model backend with a strict JSON,
//! low-temperature prompt and parses defensively. A parse failure, an
//! out-of-enum label, or a backend timeout all produce the same
//! conservative fallback: `{therapy_support, 0.5, en}`. Ambiguous input
//! is treated as needing supportive listening, never escalated to
//! crisis and never dismissed as small talk.
//!
//! Verdicts are cached for two minutes, keyed by a stable hash of the
//! message plus the last three turns, so rapid repeats skip the
//! backend entirely.

use serde::Deserialize;
use solace_cache::{stable_key, TtlCache};
use solace_core::backend::{BackendRequest, LanguageModel};
use solace_core::intent::{Intent, IntentClassification};
use solace_core::language::Language;
use solace_core::turn::TurnRecord;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// How many trailing turns participate in the cache key and prompt.
const CONTEXT_TURNS: usize = 3;

pub struct IntentClassifier {
    backend: Arc<dyn LanguageModel>,
    cache: Arc<TtlCache<IntentClassification>>,
    timeout: Duration,
}

impl IntentClassifier {
    pub fn new(
        backend: Arc<dyn LanguageModel>,
        cache: Arc<TtlCache<IntentClassification>>,
        timeout: Duration,
    ) -> Self {
        Self { backend, cache, timeout }
    }

    /// Classify a message in the context of the user's recent turns.
    /// Never fails.
    pub async fn classify(&self, message: &str, last_turns: &[TurnRecord]) -> IntentClassification {
        let key = self.cache_key(message, last_turns);

        if let Some(hit) = self.cache.get(&key).await {
            debug!(intent = %hit.intent, "Intent cache hit");
            return hit;
        }

        let classification = self.classify_uncached(message, last_turns).await;
        self.cache.insert(key, classification.clone()).await;
        classification
    }

    fn cache_key(&self, message: &str, last_turns: &[TurnRecord]) -> String {
        let tail: Vec<&str> = last_turns
            .iter()
            .rev()
            .take(CONTEXT_TURNS)
            .rev()
            .map(|t| t.user_message.as_str())
            .collect();
        let mut parts = vec![message];
        parts.extend(tail);
        stable_key(&parts)
    }

    async fn classify_uncached(&self, message: &str, last_turns: &[TurnRecord]) -> IntentClassification {
        let request = self.build_request(message, last_turns);

        let response = match tokio::time::timeout(self.timeout, self.backend.complete(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(error = %e, "Classification backend failed; using fallback");
                return IntentClassification::fallback();
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Classification timed out; using fallback"
                );
                return IntentClassification::fallback();
            }
        };

        match parse_classification(&response.content, message) {
            Some(classification) => classification,
            None => {
                warn!("Malformed classification payload; using fallback");
                IntentClassification::fallback()
            }
        }
    }

    fn build_request(&self, message: &str, last_turns: &[TurnRecord]) -> BackendRequest {
        let system = "You label messages sent to a wellness companion. \
            Choose exactly one intent: \
            therapy_support (emotional support, venting), \
            quick_tip (wants one practical suggestion), \
            plan_builder (wants a structured multi-step plan), \
            crisis (mentions of self-harm or acute danger), \
            small_talk (casual chat). \
            Respond with strict JSON only: \
            {\"intent\": \"...\", \"confidence\": number between 0 and 1, \
            \"language\": \"ISO 639-1 code\"}. No prose.";

        let mut user = String::new();
        for turn in last_turns.iter().rev().take(CONTEXT_TURNS).rev() {
            user.push_str("Previous: ");
            user.push_str(&turn.user_message);
            user.push('\n');
        }
        user.push_str("Message: ");
        user.push_str(message);

        BackendRequest::prompt(system, user, 0.0).with_max_tokens(128)
    }
}

#[derive(Deserialize)]
struct RawClassification {
    intent: String,
    confidence: f32,
    #[serde(default)]
    language: Option<String>,
}

/// Parse the model's strict-JSON verdict. `None` means fallback.
fn parse_classification(content: &str, message: &str) -> Option<IntentClassification> {
    let raw: RawClassification = serde_json::from_str(extract_json(content)).ok()?;
    let intent = Intent::parse(&raw.intent)?;
    let language = raw
        .language
        .as_deref()
        .and_then(Language::parse)
        .unwrap_or_else(|| detect_language(message));
    Some(IntentClassification::new(intent, raw.confidence, language))
}

/// Detect the message language from its text. Used here when the model
/// omits or mangles the language field, and by the pipeline to scope
/// the crisis lexicon before classification has run.
pub fn detect_language(message: &str) -> Language {
    match whatlang::detect_lang(message) {
        Some(whatlang::Lang::Spa) => Language::Es,
        Some(whatlang::Lang::Fra) => Language::Fr,
        Some(whatlang::Lang::Deu) => Language::De,
        Some(whatlang::Lang::Por) => Language::Pt,
        _ => Language::En,
    }
}

fn extract_json(content: &str) -> &str {
    let start = content.find('{');
    let end = content.rfind('}');
    match (start, end) {
        (Some(s), Some(e)) if e >= s => &content[s..=e],
        _ => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solace_backends::ScriptedBackend;
    use solace_core::error::BackendError;

    fn cache() -> Arc<TtlCache<IntentClassification>> {
        Arc::new(TtlCache::new(Duration::from_secs(120)))
    }

    fn turn(message: &str) -> TurnRecord {
        TurnRecord {
            id: TurnRecord::new_id(),
            user_id: "u1".into(),
            timestamp: chrono::Utc::now(),
            user_message: message.into(),
            language: Language::En,
            intent: Intent::SmallTalk,
            confidence: 0.8,
            tools_used: vec![],
            response: "ok".into(),
            emotional_tone: Default::default(),
            stress_level: None,
        }
    }

    #[tokio::test]
    async fn well_formed_verdict_is_used() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            r#"{"intent": "quick_tip", "confidence": 0.85, "language": "en"}"#,
        ]));
        let classifier = IntentClassifier::new(backend, cache(), Duration::from_secs(1));

        let c = classifier.classify("any tips for sleeping better?", &[]).await;
        assert_eq!(c.intent, Intent::QuickTip);
        assert!((c.confidence - 0.85).abs() < 1e-6);
        assert_eq!(c.language, Language::En);
    }

    #[tokio::test]
    async fn malformed_json_falls_back() {
        let backend = Arc::new(ScriptedBackend::new(vec!["sure! here's my analysis..."]));
        let classifier = IntentClassifier::new(backend, cache(), Duration::from_secs(1));

        let c = classifier.classify("hello", &[]).await;
        assert_eq!(c, IntentClassification::fallback());
    }

    #[tokio::test]
    async fn out_of_enum_label_falls_back() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            r#"{"intent": "venting", "confidence": 0.9, "language": "en"}"#,
        ]));
        let classifier = IntentClassifier::new(backend, cache(), Duration::from_secs(1));

        let c = classifier.classify("ugh, today", &[]).await;
        assert_eq!(c, IntentClassification::fallback());
    }

    #[tokio::test]
    async fn low_confidence_forces_therapy_support() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            r#"{"intent": "small_talk", "confidence": 0.4, "language": "en"}"#,
        ]));
        let classifier = IntentClassifier::new(backend, cache(), Duration::from_secs(1));

        let c = classifier.classify("hmm", &[]).await;
        assert_eq!(c.intent, Intent::TherapySupport);
        assert!((c.confidence - 0.4).abs() < 1e-6);
    }

    #[tokio::test]
    async fn backend_timeout_falls_back_without_throwing() {
        let backend = Arc::new(
            ScriptedBackend::always(r#"{"intent": "small_talk", "confidence": 0.9}"#)
                .with_delay(Duration::from_secs(10)),
        );
        let classifier = IntentClassifier::new(backend, cache(), Duration::from_millis(50));

        let c = classifier.classify("hey there", &[]).await;
        assert_eq!(c, IntentClassification::fallback());
    }

    #[tokio::test]
    async fn backend_error_falls_back() {
        let backend = Arc::new(ScriptedBackend::failing(BackendError::Network("down".into())));
        let classifier = IntentClassifier::new(backend, cache(), Duration::from_secs(1));

        let c = classifier.classify("hey", &[]).await;
        assert_eq!(c, IntentClassification::fallback());
    }

    #[tokio::test]
    async fn second_call_hits_cache() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            r#"{"intent": "plan_builder", "confidence": 0.9, "language": "en"}"#,
        ]));
        let scripted = backend.clone();
        let classifier = IntentClassifier::new(backend, cache(), Duration::from_secs(1));

        let first = classifier.classify("help me plan my week", &[]).await;
        let second = classifier.classify("help me plan my week", &[]).await;
        assert_eq!(first, second);
        assert_eq!(scripted.call_count(), 1);
    }

    #[tokio::test]
    async fn cache_key_covers_recent_turns() {
        let backend = Arc::new(ScriptedBackend::with_outcomes(vec![
            Ok(r#"{"intent": "quick_tip", "confidence": 0.8, "language": "en"}"#.into()),
            Ok(r#"{"intent": "therapy_support", "confidence": 0.8, "language": "en"}"#.into()),
        ]));
        let scripted = backend.clone();
        let classifier = IntentClassifier::new(backend, cache(), Duration::from_secs(1));

        let a = classifier.classify("what should I do?", &[turn("I sleep badly")]).await;
        let b = classifier.classify("what should I do?", &[turn("my job is stressful")]).await;
        assert_eq!(scripted.call_count(), 2);
        assert_ne!(a.intent, b.intent);
    }

    #[tokio::test]
    async fn missing_language_is_detected_from_message() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            r#"{"intent": "therapy_support", "confidence": 0.8}"#,
        ]));
        let classifier = IntentClassifier::new(backend, cache(), Duration::from_secs(1));

        let c = classifier
            .classify("estoy muy cansado de todo esto y necesito hablar con alguien", &[])
            .await;
        assert_eq!(c.intent, Intent::TherapySupport);
        assert_eq!(c.language, Language::Es);
    }

    #[tokio::test]
    async fn fenced_json_still_parses() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            "```json\n{\"intent\": \"small_talk\", \"confidence\": 0.92, \"language\": \"en\"}\n```",
        ]));
        let classifier = IntentClassifier::new(backend, cache(), Duration::from_secs(1));

        let c = classifier.classify("hi!", &[]).await;
        assert_eq!(c.intent, Intent::SmallTalk);
    }
}
