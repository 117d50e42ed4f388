//! Crisis detection and response value objects.
//!
//! The guardrail engine produces a [`CrisisDetection`] for every message
//! and, when the detection is positive, a fixed [`CrisisResponse`] that
//! the rest of the pipeline cannot alter.

use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Urgency of a safety intervention. Ordinal: `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrisisSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CrisisSeverity {
    pub fn label(&self) -> &'static str {
        match self {
            CrisisSeverity::Low => "low",
            CrisisSeverity::Medium => "medium",
            CrisisSeverity::High => "high",
            CrisisSeverity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for CrisisSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The category of crisis, resolved by fixed priority order:
/// suicidal > self_harm > violence > panic > acute_distress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrisisType {
    Suicidal,
    SelfHarm,
    Violence,
    Panic,
    AcuteDistress,
}

impl CrisisType {
    /// All types in priority order (highest first).
    pub const PRIORITY: [CrisisType; 5] = [
        CrisisType::Suicidal,
        CrisisType::SelfHarm,
        CrisisType::Violence,
        CrisisType::Panic,
        CrisisType::AcuteDistress,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CrisisType::Suicidal => "suicidal",
            CrisisType::SelfHarm => "self_harm",
            CrisisType::Violence => "violence",
            CrisisType::Panic => "panic",
            CrisisType::AcuteDistress => "acute_distress",
        }
    }
}

impl std::fmt::Display for CrisisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The guardrail's verdict for one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisDetection {
    pub is_crisis: bool,

    pub severity: CrisisSeverity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crisis_type: Option<CrisisType>,

    /// Detector confidence in [0, 1].
    pub confidence: f32,

    /// Matched lexicon keywords (lowercased). Logged for auditing;
    /// never includes the raw message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    pub language: Language,
}

impl CrisisDetection {
    /// A negative detection in the given language.
    pub fn none(language: Language) -> Self {
        Self {
            is_crisis: false,
            severity: CrisisSeverity::Low,
            crisis_type: None,
            confidence: 0.0,
            keywords: Vec::new(),
            language,
        }
    }
}

/// The fixed response bundle emitted on the crisis branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisResponse {
    /// First words the user sees. Localized per severity.
    pub immediate_response: String,

    /// Concrete next steps, rendered as bullet lines.
    pub next_steps: Vec<String>,

    /// Helpline directory entry for the user's language.
    pub helpline_info: String,

    /// Added for panic-type crises.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breathing_exercise: Option<String>,

    /// When true, no advice content may follow in this turn.
    pub should_defer_advice: bool,

    /// Whether a human should be looped in.
    pub requires_human_intervention: bool,
}

impl CrisisResponse {
    /// Render the full message shown to the user.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.immediate_response);
        out.push_str("\n\n");
        for step in &self.next_steps {
            out.push_str("- ");
            out.push_str(step);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.helpline_info);
        if let Some(exercise) = &self.breathing_exercise {
            out.push_str("\n\n");
            out.push_str(exercise);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_ordinal() {
        assert!(CrisisSeverity::Low < CrisisSeverity::Medium);
        assert!(CrisisSeverity::Medium < CrisisSeverity::High);
        assert!(CrisisSeverity::High < CrisisSeverity::Critical);
        assert_eq!(
            CrisisSeverity::High.max(CrisisSeverity::Critical),
            CrisisSeverity::Critical
        );
    }

    #[test]
    fn priority_order_starts_with_suicidal() {
        assert_eq!(CrisisType::PRIORITY[0], CrisisType::Suicidal);
        assert_eq!(CrisisType::PRIORITY[4], CrisisType::AcuteDistress);
    }

    #[test]
    fn negative_detection_defaults() {
        let d = CrisisDetection::none(Language::Es);
        assert!(!d.is_crisis);
        assert_eq!(d.severity, CrisisSeverity::Low);
        assert!(d.crisis_type.is_none());
        assert!(d.keywords.is_empty());
        assert_eq!(d.language, Language::Es);
    }

    #[test]
    fn render_includes_helpline_and_steps() {
        let r = CrisisResponse {
            immediate_response: "I'm really glad you told me.".into(),
            next_steps: vec!["Reach out to someone you trust".into()],
            helpline_info: "Call or text 988".into(),
            breathing_exercise: Some("Breathe in for 4, hold for 4, out for 4.".into()),
            should_defer_advice: true,
            requires_human_intervention: true,
        };
        let text = r.render();
        assert!(text.contains("988"));
        assert!(text.contains("- Reach out"));
        assert!(text.contains("Breathe in for 4"));
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&CrisisSeverity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }
}
