//! The critic's rule tables.
//!
//! All four checks are plain data lookups over the response text, so
//! each is exhaustively unit-testable and extending a phrase list never
//! touches control flow.

use solace_core::language::Language;

/// Empathy phrases per language. A reply passes when it contains any.
pub fn empathy_phrases(language: Language) -> &'static [&'static str] {
    match language {
        Language::Es => &[
            "gracias por",
            "te escucho",
            "suena",
            "tiene sentido",
            "me alegra",
            "es comprensible",
            "no estás sola",
            "no estás solo",
            "entiendo",
        ],
        _ => &[
            "thank you for",
            "i hear",
            "that sounds",
            "makes sense",
            "i'm glad",
            "glad you",
            "it's understandable",
            "you're not alone",
            "i understand",
            "it's okay to",
        ],
    }
}

/// Action verbs that count as concrete steps when no bullets exist.
pub fn action_verbs(language: Language) -> &'static [&'static str] {
    match language {
        Language::Es => &[
            "prueba", "escribe", "elige", "respira", "toma", "empieza", "practica", "decide",
        ],
        _ => &[
            "try", "take", "write", "pick", "start", "practice", "breathe", "decide", "name",
            "set", "plan",
        ],
    }
}

/// Clinical terms a companion reply must not contain, with neutral
/// replacements used by the deterministic patch.
pub fn medical_terms(language: Language) -> &'static [(&'static str, &'static str)] {
    match language {
        Language::Es => &[
            ("diagnóstico", "una idea de lo que pasa"),
            ("diagnosticar", "entender lo que pasa"),
            ("medicación", "opciones de apoyo"),
            ("antidepresivo", "apoyo profesional"),
            ("trastorno", "dificultad"),
            ("dosis", "apoyo"),
        ],
        _ => &[
            ("diagnosis", "a sense of what's going on"),
            ("diagnose", "understand what's going on"),
            ("medication", "support options"),
            ("antidepressant", "professional support"),
            ("clinical depression", "a persistent low mood"),
            ("disorder", "difficulty"),
            ("dosage", "support"),
            ("prescription", "professional guidance"),
            ("prescribe", "suggest"),
        ],
    }
}

/// Reply opens with or contains an empathetic phrase.
pub fn is_empathetic(response: &str, language: Language) -> bool {
    let text = response.to_lowercase();
    empathy_phrases(language).iter().any(|p| text.contains(p))
}

/// Reply contains bullet lines or action verbs.
pub fn has_concrete_steps(response: &str, language: Language) -> bool {
    if response.lines().any(|l| l.trim_start().starts_with("- ")) {
        return true;
    }
    let text = response.to_lowercase();
    action_verbs(language)
        .iter()
        .any(|v| text.split(|c: char| !c.is_alphabetic()).any(|w| w == *v))
}

/// Reply script matches the requested language. Lenient by design:
/// only a reliable detection of a different supported language fails.
pub fn is_language_consistent(response: &str, language: Language) -> bool {
    // Too little text for script detection to mean anything.
    if response.chars().filter(|c| c.is_alphabetic()).count() < 40 {
        return true;
    }
    let info = match whatlang::detect(response) {
        Some(info) => info,
        None => return true,
    };
    if !info.is_reliable() {
        return true;
    }
    let detected = match info.lang() {
        whatlang::Lang::Eng => Language::En,
        whatlang::Lang::Spa => Language::Es,
        whatlang::Lang::Fra => Language::Fr,
        whatlang::Lang::Deu => Language::De,
        whatlang::Lang::Por => Language::Pt,
        _ => return true,
    };
    detected == language
}

/// Reply contains clinical/diagnostic claims (must be false to pass).
pub fn has_medical_claims(response: &str, language: Language) -> bool {
    let text = response.to_lowercase();
    medical_terms(language).iter().any(|(term, _)| text.contains(term))
}
