//! Language-scoped reply template pools.
//!
//! Pools are keyed by (intent, language). Compiled sets go through the
//! injected template cache (24 h TTL with an eager sweeper) so repeated
//! composition for the same key skips the build. A language without a
//! localized pool for an intent falls back to English.

use solace_cache::TtlCache;
use solace_core::intent::Intent;
use solace_core::language::Language;
use std::sync::Arc;

/// A compiled template set for one (intent, language) pair.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub validations: Vec<String>,
    pub actions: Vec<String>,
    pub nudges: Vec<String>,
    pub ctas: Vec<String>,
}

/// Template store with a TTL cache in front of the static tables.
pub struct TemplateStore {
    cache: Arc<TtlCache<Arc<TemplateSet>>>,
}

impl TemplateStore {
    pub fn new(cache: Arc<TtlCache<Arc<TemplateSet>>>) -> Self {
        Self { cache }
    }

    /// Get the compiled set for an intent and language, building and
    /// caching it on miss. Falls back to English when the language has
    /// no localized pool.
    pub async fn get(&self, intent: Intent, language: Language) -> Arc<TemplateSet> {
        let effective = if has_localized_pool(language) {
            language
        } else {
            Language::En
        };
        let key = format!("{}:{}", intent.label(), effective.code());

        if let Some(set) = self.cache.get(&key).await {
            return set;
        }

        let set = Arc::new(build(intent, effective));
        self.cache.insert(key, set.clone()).await;
        set
    }
}

fn has_localized_pool(language: Language) -> bool {
    matches!(language, Language::En | Language::Es)
}

fn build(intent: Intent, language: Language) -> TemplateSet {
    match language {
        Language::Es => build_es(intent),
        _ => build_en(intent),
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn build_en(intent: Intent) -> TemplateSet {
    match intent {
        Intent::TherapySupport | Intent::Crisis => TemplateSet {
            validations: owned(&[
                "Thank you for trusting me with this. What you're feeling is real, and it matters.",
                "That sounds genuinely hard. It makes sense that you feel this way.",
                "I hear you. Carrying this takes more energy than people realize.",
            ]),
            actions: owned(&[
                "Take one slow breath and notice where the tension sits in your body",
                "Write down the thought that keeps circling, exactly as it sounds",
                "Name one small thing that helped you feel steadier in the past week",
                "Give yourself permission to do one thing less today",
            ]),
            nudges: owned(&[
                "You don't have to fix everything today.",
                "Feeling this way doesn't mean you're failing.",
            ]),
            ctas: owned(&[
                "Would you like to tell me more about what's weighing on you?",
                "What part of this feels heaviest right now?",
            ]),
        },
        Intent::QuickTip => TemplateSet {
            validations: owned(&[
                "Good question, and I'm glad you asked it.",
                "Glad you brought this up. Small changes genuinely help here.",
            ]),
            actions: owned(&[
                "Pick the smallest version of the change you want to make",
                "Attach the new habit to something you already do daily",
                "Track it for three days before judging whether it works",
                "Tell one person what you're trying, so it exists outside your head",
            ]),
            nudges: owned(&["Small steps compound faster than big plans."]),
            ctas: owned(&[
                "Want to try one of these today?",
                "Which of these feels easiest to start with?",
            ]),
        },
        Intent::PlanBuilder => TemplateSet {
            validations: owned(&[
                "It makes sense to want a clear path here. Let's break this down together.",
                "Okay, I hear you. We can make this manageable.",
            ]),
            actions: owned(&[
                "Write the goal as one sentence you'd say out loud",
                "Split it into pieces that each take under an hour",
                "Decide what the very first piece is and when it happens",
                "Plan one checkpoint to see how it's going",
            ]),
            nudges: owned(&["A plan you can actually finish beats a perfect one."]),
            ctas: owned(&["Which step feels doable first?"]),
        },
        Intent::SmallTalk => TemplateSet {
            validations: owned(&[
                "Hey! I'm glad you stopped by.",
                "Hi there! Glad you checked in.",
            ]),
            actions: owned(&[
                "Tell me one good thing from your day, however small",
                "If you feel like it, do a quick one-word mood check-in",
                "Take a stretch break while we chat",
            ]),
            nudges: owned(&["I'm around whenever you want to talk about anything deeper."]),
            ctas: owned(&["How has your day been treating you?"]),
        },
    }
}

fn build_es(intent: Intent) -> TemplateSet {
    match intent {
        Intent::TherapySupport | Intent::Crisis => TemplateSet {
            validations: owned(&[
                "Gracias por confiarme esto. Lo que sientes es real e importa.",
                "Suena realmente difícil. Tiene sentido que te sientas así.",
            ]),
            actions: owned(&[
                "Respira lento una vez y nota dónde se acumula la tensión",
                "Escribe el pensamiento que da vueltas, tal como suena",
                "Nombra una cosa pequeña que te ayudó esta semana",
            ]),
            nudges: owned(&["No tienes que arreglarlo todo hoy."]),
            ctas: owned(&["¿Quieres contarme más sobre lo que te pesa?"]),
        },
        Intent::QuickTip => TemplateSet {
            validations: owned(&["Buena pregunta; me alegra que la hagas."]),
            actions: owned(&[
                "Elige la versión más pequeña del cambio que quieres hacer",
                "Une el nuevo hábito a algo que ya haces a diario",
                "Pruébalo tres días antes de juzgar si funciona",
            ]),
            nudges: owned(&["Los pasos pequeños se acumulan más rápido que los grandes planes."]),
            ctas: owned(&["¿Quieres probar uno de estos hoy?"]),
        },
        Intent::PlanBuilder => TemplateSet {
            validations: owned(&["Tiene sentido querer un camino claro. Vamos a desglosarlo juntos."]),
            actions: owned(&[
                "Escribe la meta en una sola frase",
                "Divídela en partes de menos de una hora",
                "Decide cuál es la primera parte y cuándo ocurre",
            ]),
            nudges: owned(&["Un plan que puedas terminar vale más que uno perfecto."]),
            ctas: owned(&["¿Qué paso se siente más alcanzable primero?"]),
        },
        Intent::SmallTalk => TemplateSet {
            validations: owned(&["¡Hola! Me alegra saber de ti."]),
            actions: owned(&[
                "Cuéntame una cosa buena de tu día, por pequeña que sea",
                "Si te apetece, haz un registro de ánimo en una palabra",
            ]),
            nudges: owned(&["Estoy aquí cuando quieras hablar de algo más profundo."]),
            ctas: owned(&["¿Cómo te ha tratado el día?"]),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn store() -> TemplateStore {
        TemplateStore::new(Arc::new(TtlCache::new(Duration::from_secs(86_400))))
    }

    #[tokio::test]
    async fn english_pools_exist_for_all_intents() {
        let store = store();
        for intent in [
            Intent::TherapySupport,
            Intent::QuickTip,
            Intent::PlanBuilder,
            Intent::SmallTalk,
        ] {
            let set = store.get(intent, Language::En).await;
            assert!(!set.validations.is_empty(), "{intent}");
            assert!(set.actions.len() >= 2, "{intent}");
            assert!(!set.nudges.is_empty(), "{intent}");
            assert!(!set.ctas.is_empty(), "{intent}");
        }
    }

    #[tokio::test]
    async fn spanish_pool_is_localized() {
        let store = store();
        let set = store.get(Intent::TherapySupport, Language::Es).await;
        assert!(set.validations[0].contains("Gracias"));
    }

    #[tokio::test]
    async fn unlocalized_language_falls_back_to_english() {
        let store = store();
        let set = store.get(Intent::QuickTip, Language::De).await;
        assert!(set.validations[0].contains("question"));
    }

    #[tokio::test]
    async fn second_get_is_cached() {
        let store = store();
        let a = store.get(Intent::QuickTip, Language::En).await;
        let b = store.get(Intent::QuickTip, Language::En).await;
        assert!(Arc::ptr_eq(&a, &b));
    }
}
