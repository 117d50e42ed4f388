//! Language-scoped crisis keyword lexicons.
//!
//! Each lexicon partitions its phrases into three severity weight
//! classes. The tables are plain data: adding a language or a phrase
//! never touches detection control flow.

use solace_core::crisis::CrisisType;
use solace_core::language::Language;
use std::collections::HashMap;

/// Severity weight class of a lexicon phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordWeight {
    High,
    Medium,
    Low,
}

impl KeywordWeight {
    /// Score contribution of one matched phrase.
    pub fn value(&self) -> f32 {
        match self {
            KeywordWeight::High => 2.0,
            KeywordWeight::Medium => 1.0,
            KeywordWeight::Low => 0.5,
        }
    }
}

/// One phrase in a lexicon.
#[derive(Debug, Clone)]
pub struct LexiconEntry {
    pub phrase: &'static str,
    pub weight: KeywordWeight,
}

/// A lexicon for one language: weighted phrases plus the substrings
/// that resolve the crisis type.
#[derive(Debug, Clone)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
    /// (type, marker substrings); checked in [`CrisisType::PRIORITY`] order.
    type_markers: Vec<(CrisisType, Vec<&'static str>)>,
}

impl Lexicon {
    /// Scan a message and return the matched phrases with weights.
    /// Matching is case-insensitive substring containment.
    pub fn scan(&self, message: &str) -> Vec<(&'static str, KeywordWeight)> {
        let haystack = message.to_lowercase();
        self.entries
            .iter()
            .filter(|e| haystack.contains(e.phrase))
            .map(|e| (e.phrase, e.weight))
            .collect()
    }

    /// Resolve the crisis type from matched keywords by fixed priority:
    /// suicidal > self_harm > violence > panic > acute_distress.
    pub fn resolve_type(&self, matched: &[&str]) -> Option<CrisisType> {
        for ty in CrisisType::PRIORITY {
            let markers = self
                .type_markers
                .iter()
                .find(|(t, _)| *t == ty)
                .map(|(_, m)| m.as_slice())
                .unwrap_or(&[]);
            for keyword in matched {
                if markers.iter().any(|m| keyword.contains(m)) {
                    return Some(ty);
                }
            }
        }
        None
    }
}

/// The full lexicon set, keyed by language. Languages without their own
/// lexicon fall back to English.
pub struct Lexicons {
    by_language: HashMap<Language, Lexicon>,
}

impl Lexicons {
    pub fn get(&self, language: Language) -> &Lexicon {
        self.by_language
            .get(&language)
            .unwrap_or_else(|| &self.by_language[&Language::En])
    }
}

impl Default for Lexicons {
    fn default() -> Self {
        let mut by_language = HashMap::new();
        by_language.insert(Language::En, english());
        by_language.insert(Language::Es, spanish());
        Self { by_language }
    }
}

fn english() -> Lexicon {
    use KeywordWeight::*;
    let entries = vec![
        // High weight: explicit self-directed or other-directed harm
        LexiconEntry { phrase: "kill myself", weight: High },
        LexiconEntry { phrase: "suicide", weight: High },
        LexiconEntry { phrase: "suicidal", weight: High },
        LexiconEntry { phrase: "end my life", weight: High },
        LexiconEntry { phrase: "want to die", weight: High },
        LexiconEntry { phrase: "better off dead", weight: High },
        LexiconEntry { phrase: "hurt myself", weight: High },
        LexiconEntry { phrase: "cut myself", weight: High },
        LexiconEntry { phrase: "self-harm", weight: High },
        LexiconEntry { phrase: "self harm", weight: High },
        LexiconEntry { phrase: "hurt someone", weight: High },
        LexiconEntry { phrase: "kill them", weight: High },
        // Medium weight: acute states
        LexiconEntry { phrase: "end it all", weight: Medium },
        LexiconEntry { phrase: "no reason to live", weight: Medium },
        LexiconEntry { phrase: "can't go on", weight: Medium },
        LexiconEntry { phrase: "panic attack", weight: Medium },
        LexiconEntry { phrase: "can't breathe", weight: Medium },
        LexiconEntry { phrase: "heart is racing", weight: Medium },
        LexiconEntry { phrase: "falling apart", weight: Medium },
        // Low weight: distress signals
        LexiconEntry { phrase: "hopeless", weight: Low },
        LexiconEntry { phrase: "worthless", weight: Low },
        LexiconEntry { phrase: "can't take it anymore", weight: Low },
        LexiconEntry { phrase: "breaking down", weight: Low },
        LexiconEntry { phrase: "give up", weight: Low },
    ];
    let type_markers = vec![
        (CrisisType::Suicidal, vec!["kill myself", "suicid", "end my life", "want to die", "better off dead", "no reason to live"]),
        (CrisisType::SelfHarm, vec!["hurt myself", "cut myself", "self-harm", "self harm"]),
        (CrisisType::Violence, vec!["hurt someone", "kill them"]),
        (CrisisType::Panic, vec!["panic", "can't breathe", "heart is racing"]),
        (CrisisType::AcuteDistress, vec!["falling apart", "breaking down", "can't go on", "can't take it", "hopeless", "end it all"]),
    ];
    Lexicon { entries, type_markers }
}

fn spanish() -> Lexicon {
    use KeywordWeight::*;
    let entries = vec![
        LexiconEntry { phrase: "matarme", weight: High },
        LexiconEntry { phrase: "suicidio", weight: High },
        LexiconEntry { phrase: "suicidarme", weight: High },
        LexiconEntry { phrase: "quitarme la vida", weight: High },
        LexiconEntry { phrase: "quiero morir", weight: High },
        LexiconEntry { phrase: "hacerme daño", weight: High },
        LexiconEntry { phrase: "cortarme", weight: High },
        LexiconEntry { phrase: "lastimar a alguien", weight: High },
        LexiconEntry { phrase: "no puedo más", weight: Medium },
        LexiconEntry { phrase: "ataque de pánico", weight: Medium },
        LexiconEntry { phrase: "no puedo respirar", weight: Medium },
        LexiconEntry { phrase: "sin razón para vivir", weight: Medium },
        LexiconEntry { phrase: "sin esperanza", weight: Low },
        LexiconEntry { phrase: "no valgo nada", weight: Low },
        LexiconEntry { phrase: "me rindo", weight: Low },
    ];
    let type_markers = vec![
        (CrisisType::Suicidal, vec!["matarme", "suicid", "quitarme la vida", "quiero morir", "sin razón para vivir"]),
        (CrisisType::SelfHarm, vec!["hacerme daño", "cortarme"]),
        (CrisisType::Violence, vec!["lastimar a alguien"]),
        (CrisisType::Panic, vec!["pánico", "no puedo respirar"]),
        (CrisisType::AcuteDistress, vec!["no puedo más", "sin esperanza"]),
    ];
    Lexicon { entries, type_markers }
}
