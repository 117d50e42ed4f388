//! Language tags and the localization fallback chain.
//!
//! Every localized asset (crisis lexicons, response templates, helplines,
//! empathy phrase tables) is keyed by [`Language`]. A closed enum keeps
//! the tables exhaustively matchable; anything we do not localize for
//! falls back to English.

use serde::{Deserialize, Serialize};

/// A language the companion can reply in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (the fallback for every chain)
    #[default]
    En,
    /// Spanish
    Es,
    /// French
    Fr,
    /// German
    De,
    /// Portuguese
    Pt,
}

impl Language {
    /// The ISO 639-1 code for this language.
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
            Language::Pt => "pt",
        }
    }

    /// Parse an ISO 639-1 tag (case-insensitive, region suffixes ignored).
    ///
    /// Unknown tags return `None`; callers decide whether to fall back.
    pub fn parse(tag: &str) -> Option<Self> {
        let base = tag.trim().to_lowercase();
        let base = base.split(['-', '_']).next().unwrap_or("");
        match base {
            "en" => Some(Language::En),
            "es" => Some(Language::Es),
            "fr" => Some(Language::Fr),
            "de" => Some(Language::De),
            "pt" => Some(Language::Pt),
            _ => None,
        }
    }

    /// Parse with English fallback for unknown or empty tags.
    pub fn parse_or_default(tag: &str) -> Self {
        Self::parse(tag).unwrap_or_default()
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
