//! Intent labels and the classification value object.
//!
//! The classifier labels every safe-path message with one of five
//! intents. Classification carries a confidence in [0, 1]; anything
//! below [`CONFIDENCE_FLOOR`] is forced to `therapy_support`. Ambiguous
//! input is always treated as needing supportive listening, never
//! escalated to crisis or dismissed as small talk.

use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Confidence below this forces the intent to [`Intent::TherapySupport`].
pub const CONFIDENCE_FLOOR: f32 = 0.55;

/// What the user is asking for in this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Emotional support, open-ended listening
    TherapySupport,
    /// A short, actionable suggestion
    QuickTip,
    /// Help structuring a multi-step plan
    PlanBuilder,
    /// A safety concern (set by the guardrail, never by the classifier alone)
    Crisis,
    /// Casual conversation
    SmallTalk,
}

impl Intent {
    /// The wire label used in classification prompts and JSON payloads.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::TherapySupport => "therapy_support",
            Intent::QuickTip => "quick_tip",
            Intent::PlanBuilder => "plan_builder",
            Intent::Crisis => "crisis",
            Intent::SmallTalk => "small_talk",
        }
    }

    /// Parse a wire label. Out-of-enum labels return `None` so the
    /// classifier can apply its conservative fallback.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "therapy_support" => Some(Intent::TherapySupport),
            "quick_tip" => Some(Intent::QuickTip),
            "plan_builder" => Some(Intent::PlanBuilder),
            "crisis" => Some(Intent::Crisis),
            "small_talk" => Some(Intent::SmallTalk),
            _ => None,
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The classifier's verdict for one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentClassification {
    pub intent: Intent,

    /// Always in [0, 1].
    pub confidence: f32,

    /// Detected language of the message.
    pub language: Language,
}

impl IntentClassification {
    /// Build a classification, enforcing the invariants: confidence is
    /// clamped to [0, 1] and anything under [`CONFIDENCE_FLOOR`] is
    /// forced to `therapy_support`.
    pub fn new(intent: Intent, confidence: f32, language: Language) -> Self {
        let confidence = confidence.clamp(0.0, 1.0);
        let intent = if confidence < CONFIDENCE_FLOOR {
            Intent::TherapySupport
        } else {
            intent
        };
        Self { intent, confidence, language }
    }

    /// The conservative fallback used on parse failure or backend
    /// timeout: supportive listening in English at 0.5 confidence.
    pub fn fallback() -> Self {
        Self {
            intent: Intent::TherapySupport,
            confidence: 0.5,
            language: Language::En,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_confidence_forces_therapy_support() {
        let c = IntentClassification::new(Intent::SmallTalk, 0.4, Language::En);
        assert_eq!(c.intent, Intent::TherapySupport);
        assert!((c.confidence - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn floor_is_inclusive_of_threshold() {
        let c = IntentClassification::new(Intent::QuickTip, 0.55, Language::En);
        assert_eq!(c.intent, Intent::QuickTip);

        let c = IntentClassification::new(Intent::QuickTip, 0.549, Language::En);
        assert_eq!(c.intent, Intent::TherapySupport);
    }

    #[test]
    fn confidence_is_clamped() {
        let c = IntentClassification::new(Intent::QuickTip, 1.7, Language::En);
        assert!((c.confidence - 1.0).abs() < f32::EPSILON);

        let c = IntentClassification::new(Intent::QuickTip, -0.3, Language::En);
        assert!(c.confidence.abs() < f32::EPSILON);
        assert_eq!(c.intent, Intent::TherapySupport);
    }

    #[test]
    fn fallback_is_conservative() {
        let c = IntentClassification::fallback();
        assert_eq!(c.intent, Intent::TherapySupport);
        assert!((c.confidence - 0.5).abs() < f32::EPSILON);
        assert_eq!(c.language, Language::En);
    }

    #[test]
    fn label_roundtrip() {
        for intent in [
            Intent::TherapySupport,
            Intent::QuickTip,
            Intent::PlanBuilder,
            Intent::Crisis,
            Intent::SmallTalk,
        ] {
            assert_eq!(Intent::parse(intent.label()), Some(intent));
        }
        assert_eq!(Intent::parse("venting"), None);
    }
}
