//! Two-source crisis detection.
//!
//! The keyword scan always runs and is the authoritative baseline. The
//! model-based check is cost-gated (only when the scan found something)
//! and strictly best-effort: a timeout, API failure, or malformed
//! verdict is silently ignored and never blocks the keyword result.
//!
//! Escalation rules on top of the score thresholds:
//! - any high-weight match raises severity to at least High and floors
//!   the keyword confidence at 0.6
//! - explicit suicidal phrasing (high-weight match resolving to the
//!   suicidal type) is always Critical
//! - a model verdict may win on confidence, but it can never clear a
//!   detection that had a high-weight keyword match

use solace_core::backend::{BackendRequest, LanguageModel};
use solace_core::crisis::{CrisisDetection, CrisisSeverity, CrisisType};
use solace_core::language::Language;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::lexicon::{KeywordWeight, Lexicons};

/// Keyword confidence above which the model check is worth its cost.
const MODEL_CHECK_GATE: f32 = 0.3;

/// Confidence floor applied when a high-weight keyword matched.
const HIGH_WEIGHT_CONFIDENCE_FLOOR: f32 = 0.6;

/// The crisis guardrail's detection half.
pub struct CrisisDetector {
    lexicons: Lexicons,
    backend: Option<Arc<dyn LanguageModel>>,
    model_check_timeout: Duration,
}

impl CrisisDetector {
    /// Keyword-only detector.
    pub fn new() -> Self {
        Self {
            lexicons: Lexicons::default(),
            backend: None,
            model_check_timeout: Duration::from_millis(1_500),
        }
    }

    /// Enable the optional model-based check.
    pub fn with_model_check(mut self, backend: Arc<dyn LanguageModel>, timeout: Duration) -> Self {
        self.backend = Some(backend);
        self.model_check_timeout = timeout;
        self
    }

    /// Detect whether a message indicates a crisis.
    ///
    /// Never fails: the worst case is a keyword-only verdict.
    pub async fn detect(&self, message: &str, language: Language) -> CrisisDetection {
        let (keyword, high_weight) = self.keyword_scan(message, language);

        let model = if self.backend.is_some()
            && (keyword.confidence > MODEL_CHECK_GATE || !keyword.keywords.is_empty())
        {
            self.model_check(message, language).await
        } else {
            None
        };

        let detection = self.combine(keyword, model, high_weight, language);

        if detection.is_crisis {
            // Metadata only: the raw message never reaches the audit log.
            warn!(
                target: "crisis_audit",
                severity = %detection.severity,
                crisis_type = ?detection.crisis_type,
                confidence = detection.confidence,
                keywords = ?detection.keywords,
                message_len = message.chars().count(),
                timestamp = %chrono::Utc::now(),
                "Crisis detected"
            );
        }

        detection
    }

    /// Weighted keyword scan. Returns the verdict and whether any
    /// high-weight phrase matched.
    fn keyword_scan(&self, message: &str, language: Language) -> (CrisisDetection, bool) {
        let lexicon = self.lexicons.get(language);
        let matches = lexicon.scan(message);

        if matches.is_empty() {
            return (CrisisDetection::none(language), false);
        }

        let score: f32 = matches.iter().map(|(_, w)| w.value()).sum();
        let high_weight = matches.iter().any(|(_, w)| *w == KeywordWeight::High);
        let keywords: Vec<String> = matches.iter().map(|(p, _)| p.to_string()).collect();
        let matched: Vec<&str> = matches.iter().map(|(p, _)| *p).collect();
        let crisis_type = lexicon.resolve_type(&matched);

        let mut severity = if score >= 4.0 {
            CrisisSeverity::Critical
        } else if score >= 3.0 {
            CrisisSeverity::High
        } else if score >= 2.0 {
            CrisisSeverity::Medium
        } else {
            CrisisSeverity::Low
        };

        let mut confidence = (matches.len() as f32 * 0.3).min(0.9);

        if high_weight {
            severity = severity.max(CrisisSeverity::High);
            confidence = confidence.max(HIGH_WEIGHT_CONFIDENCE_FLOOR);
            if crisis_type == Some(CrisisType::Suicidal) {
                severity = CrisisSeverity::Critical;
            }
        }

        let is_crisis = high_weight || score >= 2.0;

        (
            CrisisDetection {
                is_crisis,
                severity,
                crisis_type,
                confidence,
                keywords,
                language,
            },
            high_weight,
        )
    }

    /// Best-effort model verdict. Any failure returns `None`.
    async fn model_check(&self, message: &str, language: Language) -> Option<CrisisDetection> {
        let backend = self.backend.as_ref()?;

        let system = "You are a safety reviewer for a wellness companion. \
            Assess whether the user message indicates an acute mental-health crisis. \
            Respond with strict JSON only: \
            {\"is_crisis\": boolean, \"severity\": \"low\"|\"medium\"|\"high\"|\"critical\", \
            \"crisis_type\": \"suicidal\"|\"self_harm\"|\"violence\"|\"panic\"|\"acute_distress\"|null, \
            \"confidence\": number between 0 and 1}. No prose.";
        let request = BackendRequest::prompt(system, message, 0.0).with_max_tokens(128);

        let response = match tokio::time::timeout(self.model_check_timeout, backend.complete(request)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                debug!(error = %e, "Crisis model check failed; keeping keyword verdict");
                return None;
            }
            Err(_) => {
                debug!(
                    timeout_ms = self.model_check_timeout.as_millis() as u64,
                    "Crisis model check timed out; keeping keyword verdict"
                );
                return None;
            }
        };

        let verdict: ModelVerdict = serde_json::from_str(extract_json(&response.content)).ok()?;
        let confidence = verdict.confidence.clamp(0.0, 1.0);

        Some(CrisisDetection {
            is_crisis: verdict.is_crisis,
            severity: verdict.severity,
            crisis_type: verdict.crisis_type,
            confidence,
            keywords: Vec::new(),
            language,
        })
    }

    /// Combine the two sources: the higher-confidence verdict wins
    /// entirely, ties favor the keyword result, and severity is
    /// non-decreasing when both sources agree on crisis.
    fn combine(
        &self,
        keyword: CrisisDetection,
        model: Option<CrisisDetection>,
        high_weight: bool,
        language: Language,
    ) -> CrisisDetection {
        let Some(model) = model else {
            return keyword;
        };

        // A model all-clear cannot override a high-weight keyword hit.
        if high_weight && !model.is_crisis {
            debug!(
                model_confidence = model.confidence,
                "Model verdict cleared a high-weight keyword match; ignoring model"
            );
            return keyword;
        }

        let both_crisis = keyword.is_crisis && model.is_crisis;
        let floor_severity = keyword.severity.max(model.severity);

        let mut winner = if model.confidence > keyword.confidence {
            CrisisDetection {
                keywords: keyword.keywords.clone(),
                language,
                ..model
            }
        } else {
            keyword
        };

        if both_crisis {
            winner.severity = winner.severity.max(floor_severity);
        }

        winner
    }
}

impl Default for CrisisDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Strict-JSON verdict shape for the model check.
#[derive(serde::Deserialize)]
struct ModelVerdict {
    is_crisis: bool,
    severity: CrisisSeverity,
    #[serde(default)]
    crisis_type: Option<CrisisType>,
    #[serde(default)]
    confidence: f32,
}

/// Trim anything around the outermost JSON object (models like to wrap
/// verdicts in code fences).
fn extract_json(content: &str) -> &str {
    let start = content.find('{');
    let end = content.rfind('}');
    match (start, end) {
        (Some(s), Some(e)) if e >= s => &content[s..=e],
        _ => content,
    }
}
