//! Checklist-based quality gate with best-effort revision.
//!
//! Four fixed checks run over every composed reply: empathy, concrete
//! steps, language consistency, and absence of medical claims. When any
//! check fails a revision is always produced: first a backend revision
//! prompt naming exactly the failed checks, and on backend failure a
//! deterministic text patch per failed check. The original text is
//! returned untouched only when patching itself cannot change it.

pub mod checks;

use solace_core::backend::{BackendRequest, LanguageModel};
use solace_core::intent::Intent;
use solace_core::language::Language;
use solace_core::reply::{CriticCheck, CriticResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// What the critic knows about the turn it is judging.
pub struct CriticContext<'a> {
    pub intent: Intent,
    pub language: Language,
    pub original_message: &'a str,
}

pub struct Critic {
    backend: Option<Arc<dyn LanguageModel>>,
    timeout: Duration,
}

impl Critic {
    /// A critic that revises with deterministic patches only.
    pub fn new() -> Self {
        Self { backend: None, timeout: Duration::from_millis(2_500) }
    }

    /// Attempt backend revisions before falling back to patches.
    pub fn with_backend(mut self, backend: Arc<dyn LanguageModel>, timeout: Duration) -> Self {
        self.backend = Some(backend);
        self.timeout = timeout;
        self
    }

    /// Run the checklist. `passed == false` always carries a revision.
    pub async fn critique(&self, response: &str, ctx: &CriticContext<'_>) -> CriticResult {
        let failed = self.run_checks(response, ctx);

        if failed.is_empty() {
            debug!("Critique passed all checks");
            return CriticResult::pass();
        }

        debug!(failed = ?failed, "Critique failed; producing revision");

        if let Some(revised) = self.backend_revision(response, &failed, ctx).await {
            return CriticResult::fail(failed, revised);
        }

        let revised = apply_patches(response, &failed, ctx.language);
        CriticResult::fail(failed, revised)
    }

    fn run_checks(&self, response: &str, ctx: &CriticContext<'_>) -> Vec<CriticCheck> {
        let mut failed = Vec::new();
        for check in CriticCheck::ALL {
            let ok = match check {
                CriticCheck::Empathy => checks::is_empathetic(response, ctx.language),
                CriticCheck::ConcreteSteps => checks::has_concrete_steps(response, ctx.language),
                CriticCheck::LanguageConsistency => {
                    checks::is_language_consistent(response, ctx.language)
                }
                CriticCheck::MedicalClaims => !checks::has_medical_claims(response, ctx.language),
            };
            if !ok {
                failed.push(check);
            }
        }
        failed
    }

    /// Ask the backend for a revision naming exactly the failed checks.
    /// `None` on any failure.
    async fn backend_revision(
        &self,
        response: &str,
        failed: &[CriticCheck],
        ctx: &CriticContext<'_>,
    ) -> Option<String> {
        let backend = self.backend.as_ref()?;

        let labels: Vec<&str> = failed.iter().map(|c| c.label()).collect();
        let system = format!(
            "You revise replies from a wellness companion. The reply below failed these \
             quality checks: {}. Rewrite it to fix exactly those issues. Keep the same \
             meaning, keep language '{}', keep the bullet-list structure, and never make \
             clinical or diagnostic claims. Return only the revised reply.",
            labels.join(", "),
            ctx.language.code()
        );
        let user = format!("User message: {}\n\nReply to revise:\n{}", ctx.original_message, response);
        let request = BackendRequest::prompt(system.as_str(), user.as_str(), 0.3).with_max_tokens(512);

        match tokio::time::timeout(self.timeout, backend.complete(request)).await {
            Ok(Ok(r)) if !r.content.trim().is_empty() => Some(r.content.trim().to_string()),
            Ok(Ok(_)) => {
                warn!("Backend revision was empty; applying patches");
                None
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Backend revision failed; applying patches");
                None
            }
            Err(_) => {
                warn!("Backend revision timed out; applying patches");
                None
            }
        }
    }
}

impl Default for Critic {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic text patches, one per failed check.
fn apply_patches(response: &str, failed: &[CriticCheck], language: Language) -> String {
    let mut revised = response.to_string();

    for check in failed {
        match check {
            CriticCheck::Empathy | CriticCheck::LanguageConsistency => {
                // Both patches prepend a localized empathetic opener;
                // for consistency failures it also shifts the script
                // ratio toward the requested language.
                let opener = empathetic_opener(language);
                if !revised.starts_with(opener) {
                    revised = format!("{opener}\n\n{revised}");
                }
            }
            CriticCheck::ConcreteSteps => {
                revised.push_str("\n\n");
                for action in fixed_actions(language) {
                    revised.push_str("- ");
                    revised.push_str(action);
                    revised.push('\n');
                }
            }
            CriticCheck::MedicalClaims => {
                for (term, neutral) in checks::medical_terms(language) {
                    revised = replace_case_insensitive(&revised, term, neutral);
                }
            }
        }
    }

    revised
}

fn empathetic_opener(language: Language) -> &'static str {
    match language {
        Language::Es => "Gracias por contarme esto; tiene sentido que te sientas así.",
        _ => "Thank you for sharing this; it makes sense that you feel this way.",
    }
}

fn fixed_actions(language: Language) -> &'static [&'static str] {
    match language {
        Language::Es => &[
            "Respira lento tres veces antes de seguir",
            "Escribe en una frase lo que más te pesa ahora",
        ],
        _ => &[
            "Take three slow breaths before anything else",
            "Write down, in one sentence, what feels heaviest right now",
        ],
    }
}

/// Replace every case-insensitive occurrence of `term` with `neutral`.
fn replace_case_insensitive(text: &str, term: &str, neutral: &str) -> String {
    let lower_text = text.to_lowercase();
    let lower_term = term.to_lowercase();

    // Lowercasing can shift byte offsets for a handful of scripts; the
    // exact-case replace is the safe fallback there.
    if lower_text.len() != text.len() {
        return text.replace(term, neutral);
    }
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    while let Some(found) = lower_text[cursor..].find(&lower_term) {
        let start = cursor + found;
        out.push_str(&text[cursor..start]);
        out.push_str(neutral);
        cursor = start + term.len();
    }
    out.push_str(&text[cursor..]);
    out
}
