//! Composed replies and critic verdicts.

use serde::{Deserialize, Serialize};

/// Minimum and maximum bullet actions in a composed reply.
pub const MIN_ACTIONS: usize = 2;
pub const MAX_ACTIONS: usize = 5;

/// A structured reply: validation sentence(s), bullet actions, a gentle
/// nudge, and a call to action. `full_response` is always the fixed
/// concatenation of the four parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedReply {
    pub validation: String,
    pub actions: Vec<String>,
    pub nudge: String,
    pub cta: String,
    pub full_response: String,
}

impl ComposedReply {
    /// Assemble a reply, deriving `full_response` from the parts:
    /// validation, blank line, one bullet per action, blank line,
    /// nudge and call-to-action on one line.
    pub fn assemble(validation: String, actions: Vec<String>, nudge: String, cta: String) -> Self {
        let mut full = String::with_capacity(
            validation.len() + nudge.len() + cta.len() + actions.iter().map(|a| a.len() + 3).sum::<usize>() + 8,
        );
        full.push_str(&validation);
        full.push_str("\n\n");
        for action in &actions {
            full.push_str("- ");
            full.push_str(action);
            full.push('\n');
        }
        full.push('\n');
        full.push_str(&nudge);
        full.push(' ');
        full.push_str(&cta);

        Self { validation, actions, nudge, cta, full_response: full }
    }

    /// Count of bullet lines in the rendered response.
    pub fn bullet_count(&self) -> usize {
        self.full_response.lines().filter(|l| l.starts_with("- ")).count()
    }
}

/// One check in the critic's fixed checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticCheck {
    /// Reply opens with or contains an empathetic phrase
    Empathy,
    /// Reply contains bullet lines or action verbs
    ConcreteSteps,
    /// Reply script matches the requested language
    LanguageConsistency,
    /// Reply must NOT contain clinical/diagnostic claims
    MedicalClaims,
}

impl CriticCheck {
    /// All checks, in the order they run.
    pub const ALL: [CriticCheck; 4] = [
        CriticCheck::Empathy,
        CriticCheck::ConcreteSteps,
        CriticCheck::LanguageConsistency,
        CriticCheck::MedicalClaims,
    ];

    /// Name used in revision prompts.
    pub fn label(&self) -> &'static str {
        match self {
            CriticCheck::Empathy => "empathy",
            CriticCheck::ConcreteSteps => "concrete_steps",
            CriticCheck::LanguageConsistency => "language_consistency",
            CriticCheck::MedicalClaims => "medical_claims",
        }
    }
}

/// The critic's verdict. `passed == false` always comes with a revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticResult {
    pub passed: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_checks: Vec<CriticCheck>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_response: Option<String>,
}

impl CriticResult {
    pub fn pass() -> Self {
        Self { passed: true, failed_checks: Vec::new(), revised_response: None }
    }

    /// A failing verdict. The revision is mandatory by construction.
    pub fn fail(failed_checks: Vec<CriticCheck>, revised_response: String) -> Self {
        Self {
            passed: false,
            failed_checks,
            revised_response: Some(revised_response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_layout_is_fixed() {
        let reply = ComposedReply::assemble(
            "That sounds heavy, and it makes sense you feel this way.".into(),
            vec!["Take a short walk".into(), "Write down one worry".into()],
            "Small steps count.".into(),
            "Want to try one of these now?".into(),
        );
        assert_eq!(reply.bullet_count(), 2);
        assert!(reply.full_response.starts_with("That sounds heavy"));
        assert!(reply.full_response.contains("\n\n- Take a short walk\n"));
        assert!(reply.full_response.ends_with("Small steps count. Want to try one of these now?"));
    }

    #[test]
    fn failing_verdict_always_has_revision() {
        let r = CriticResult::fail(vec![CriticCheck::Empathy], "revised".into());
        assert!(!r.passed);
        assert!(r.revised_response.is_some());
    }

    #[test]
    fn check_labels() {
        assert_eq!(CriticCheck::Empathy.label(), "empathy");
        assert_eq!(CriticCheck::MedicalClaims.label(), "medical_claims");
        assert_eq!(CriticCheck::ALL.len(), 4);
    }
}
