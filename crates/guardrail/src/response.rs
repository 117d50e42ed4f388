//! Fixed crisis response generation.
//!
//! Severity maps to a fixed, language-localized template bundle;
//! the crisis type applies an additive customization on top (panic
//! adds a grounding exercise, violence prepends an emergency-services
//! instruction). Content here is static by design: the crisis branch
//! must not depend on the language-model backend.

use solace_core::crisis::{CrisisDetection, CrisisResponse, CrisisSeverity, CrisisType};
use solace_core::language::Language;
use std::collections::HashMap;

/// Helpline directory, keyed by language, with config overrides.
pub struct HelplineDirectory {
    overrides: HashMap<Language, String>,
}

impl HelplineDirectory {
    pub fn new() -> Self {
        Self { overrides: HashMap::new() }
    }

    /// Apply overrides from configuration (language code -> text).
    /// Unknown language codes are ignored.
    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        for (code, text) in overrides {
            if let Some(language) = Language::parse(code) {
                self.overrides.insert(language, text.clone());
            }
        }
        self
    }

    pub fn lookup(&self, language: Language) -> String {
        if let Some(text) = self.overrides.get(&language) {
            return text.clone();
        }
        match language {
            Language::Es => {
                "Línea de crisis: llama o envía un mensaje al 988 (EE. UU.) o al 024 (España). \
                 Disponible 24 horas, gratuita y confidencial."
            }
            _ => {
                "You can call or text 988 (Suicide & Crisis Lifeline) any time. \
                 It's free, confidential, and available 24/7."
            }
        }
        .to_string()
    }
}

impl Default for HelplineDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// The crisis guardrail's response half.
pub struct CrisisResponder {
    helplines: HelplineDirectory,
}

impl CrisisResponder {
    pub fn new(helplines: HelplineDirectory) -> Self {
        Self { helplines }
    }

    /// Build the fixed response bundle for a positive detection.
    pub fn respond(&self, detection: &CrisisDetection, language: Language) -> CrisisResponse {
        let bundle = severity_bundle(detection.severity, language);

        let mut next_steps = bundle.next_steps;
        let mut breathing_exercise = None;

        match detection.crisis_type {
            Some(CrisisType::Violence) => {
                next_steps.insert(0, emergency_instruction(language));
            }
            Some(CrisisType::Panic) => {
                breathing_exercise = Some(grounding_exercise(language));
            }
            _ => {}
        }

        CrisisResponse {
            immediate_response: bundle.immediate_response,
            next_steps,
            helpline_info: self.helplines.lookup(language),
            breathing_exercise,
            should_defer_advice: true,
            requires_human_intervention: detection.severity >= CrisisSeverity::High,
        }
    }
}

struct SeverityBundle {
    immediate_response: String,
    next_steps: Vec<String>,
}

fn severity_bundle(severity: CrisisSeverity, language: Language) -> SeverityBundle {
    match language {
        Language::Es => severity_bundle_es(severity),
        _ => severity_bundle_en(severity),
    }
}

fn severity_bundle_en(severity: CrisisSeverity) -> SeverityBundle {
    match severity {
        CrisisSeverity::Critical => SeverityBundle {
            immediate_response: "I'm really concerned about what you just shared. \
                What you're feeling matters, and you deserve support right now, not later."
                .into(),
            next_steps: vec![
                "If you are in immediate danger, call your local emergency number now".into(),
                "Reach out to the helpline below; someone is there around the clock".into(),
                "If you can, let a person you trust know how you're feeling".into(),
            ],
        },
        CrisisSeverity::High => SeverityBundle {
            immediate_response: "What you're going through sounds incredibly painful. \
                You don't have to carry this alone."
                .into(),
            next_steps: vec![
                "Consider talking to someone today: a friend, family member, or counselor".into(),
                "The helpline below is free and confidential".into(),
                "Try to stay around other people for the next few hours".into(),
            ],
        },
        CrisisSeverity::Medium => SeverityBundle {
            immediate_response: "It sounds like you're carrying something really heavy right now, \
                and I'm glad you said it out loud."
                .into(),
            next_steps: vec![
                "Take a few slow breaths before anything else".into(),
                "Consider reaching out to someone who usually helps you feel grounded".into(),
            ],
        },
        CrisisSeverity::Low => SeverityBundle {
            immediate_response: "I hear that things feel hard right now.".into(),
            next_steps: vec![
                "Be gentle with yourself for the rest of the day".into(),
                "If this feeling grows, the helpline below is always open".into(),
            ],
        },
    }
}

fn severity_bundle_es(severity: CrisisSeverity) -> SeverityBundle {
    match severity {
        CrisisSeverity::Critical => SeverityBundle {
            immediate_response: "Me preocupa mucho lo que acabas de compartir. \
                Lo que sientes importa y mereces apoyo ahora mismo."
                .into(),
            next_steps: vec![
                "Si estás en peligro inmediato, llama ahora al número de emergencias local".into(),
                "Contacta la línea de ayuda de abajo; hay alguien disponible a toda hora".into(),
                "Si puedes, cuéntale a una persona de confianza cómo te sientes".into(),
            ],
        },
        CrisisSeverity::High => SeverityBundle {
            immediate_response: "Lo que estás viviendo suena muy doloroso. \
                No tienes que cargar con esto en soledad."
                .into(),
            next_steps: vec![
                "Considera hablar hoy con alguien: una amistad, familia o un profesional".into(),
                "La línea de ayuda de abajo es gratuita y confidencial".into(),
            ],
        },
        CrisisSeverity::Medium => SeverityBundle {
            immediate_response: "Parece que llevas un peso muy grande en este momento.".into(),
            next_steps: vec![
                "Respira lento unas cuantas veces antes de cualquier otra cosa".into(),
                "Considera contactar a alguien que te haga sentir en calma".into(),
            ],
        },
        CrisisSeverity::Low => SeverityBundle {
            immediate_response: "Escucho que las cosas se sienten difíciles ahora.".into(),
            next_steps: vec![
                "Sé amable contigo durante el resto del día".into(),
                "Si este sentimiento crece, la línea de ayuda siempre está abierta".into(),
            ],
        },
    }
}

fn emergency_instruction(language: Language) -> String {
    match language {
        Language::Es => {
            "Si alguien está en peligro físico inmediato, contacta a los servicios \
             de emergencia (911/112) ahora mismo"
        }
        _ => {
            "If anyone is in immediate physical danger, contact emergency services \
             (911/112) right away"
        }
    }
    .to_string()
}

fn grounding_exercise(language: Language) -> String {
    match language {
        Language::Es => {
            "Ejercicio para ahora: inhala contando hasta 4, sostén 4, exhala 6. \
             Repite cinco veces. Luego nombra 5 cosas que ves, 4 que puedes tocar, \
             3 que escuchas."
        }
        _ => {
            "Try this right now: breathe in for a count of 4, hold for 4, out for 6. \
             Repeat five times. Then name 5 things you can see, 4 you can touch, \
             3 you can hear."
        }
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(severity: CrisisSeverity, crisis_type: Option<CrisisType>) -> CrisisDetection {
        CrisisDetection {
            is_crisis: true,
            severity,
            crisis_type,
            confidence: 0.8,
            keywords: vec!["test".into()],
            language: Language::En,
        }
    }

    #[test]
    fn critical_response_contains_helpline() {
        let responder = CrisisResponder::new(HelplineDirectory::new());
        let d = detection(CrisisSeverity::Critical, Some(CrisisType::Suicidal));
        let r = responder.respond(&d, Language::En);
        assert!(r.helpline_info.contains("988"));
        assert!(r.should_defer_advice);
        assert!(r.requires_human_intervention);
        assert!(r.render().contains("988"));
    }

    #[test]
    fn panic_adds_grounding_exercise() {
        let responder = CrisisResponder::new(HelplineDirectory::new());
        let d = detection(CrisisSeverity::Medium, Some(CrisisType::Panic));
        let r = responder.respond(&d, Language::En);
        assert!(r.breathing_exercise.is_some());
        assert!(r.breathing_exercise.unwrap().contains("breathe in"));
    }

    #[test]
    fn violence_prepends_emergency_instruction() {
        let responder = CrisisResponder::new(HelplineDirectory::new());
        let d = detection(CrisisSeverity::High, Some(CrisisType::Violence));
        let r = responder.respond(&d, Language::En);
        assert!(r.next_steps[0].contains("emergency services"));
        assert!(r.next_steps.len() >= 2);
    }

    #[test]
    fn suicidal_gets_no_additive_customization() {
        let responder = CrisisResponder::new(HelplineDirectory::new());
        let d = detection(CrisisSeverity::Critical, Some(CrisisType::Suicidal));
        let r = responder.respond(&d, Language::En);
        assert!(r.breathing_exercise.is_none());
        assert!(!r.next_steps[0].contains("emergency services (911/112)"));
    }

    #[test]
    fn spanish_bundle_is_localized() {
        let responder = CrisisResponder::new(HelplineDirectory::new());
        let d = detection(CrisisSeverity::Critical, Some(CrisisType::Suicidal));
        let r = responder.respond(&d, Language::Es);
        assert!(r.immediate_response.contains("preocupa"));
        assert!(r.helpline_info.contains("024"));
    }

    #[test]
    fn unlocalized_language_falls_back_to_english() {
        let responder = CrisisResponder::new(HelplineDirectory::new());
        let d = detection(CrisisSeverity::High, None);
        let r = responder.respond(&d, Language::De);
        assert!(r.immediate_response.contains("painful"));
    }

    #[test]
    fn low_severity_does_not_require_human() {
        let responder = CrisisResponder::new(HelplineDirectory::new());
        let d = detection(CrisisSeverity::Medium, None);
        let r = responder.respond(&d, Language::En);
        assert!(!r.requires_human_intervention);
    }

    #[test]
    fn helpline_override_wins() {
        let mut overrides = HashMap::new();
        overrides.insert("en".to_string(), "Call 0800-CARE".to_string());
        let responder =
            CrisisResponder::new(HelplineDirectory::new().with_overrides(&overrides));
        let d = detection(CrisisSeverity::Critical, None);
        let r = responder.respond(&d, Language::En);
        assert_eq!(r.helpline_info, "Call 0800-CARE");
    }
}
