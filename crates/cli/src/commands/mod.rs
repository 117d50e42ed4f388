//! CLI subcommands and shared pipeline wiring.

pub mod chat;
pub mod onboard;
pub mod turn;

use solace_backends::{OpenAiCompatBackend, ScriptedBackend};
use solace_cache::{spawn_sweeper, TtlCache};
use solace_classifier::IntentClassifier;
use solace_composer::{Composer, TemplatePicker, TemplateStore};
use solace_config::AppConfig;
use solace_critic::Critic;
use solace_core::backend::LanguageModel;
use solace_guardrail::{CrisisDetector, CrisisResponder, HelplineDirectory};
use solace_memory::{ContextMemory, MemorySettings};
use solace_pipeline::TurnPipeline;
use solace_planner::{Planner, ToolDispatcher};
use std::sync::Arc;

/// Wire the full pipeline from configuration. Returns the pipeline and
/// the template-cache sweeper handle (dropped with the process).
pub fn build_pipeline(config: &AppConfig) -> anyhow::Result<(Arc<TurnPipeline>, tokio::task::JoinHandle<()>)> {
    let online = config.backend.kind != "scripted";

    let backend: Arc<dyn LanguageModel> = if online {
        let api_key = config
            .backend
            .api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!(
                "No API key configured. Set SOLACE_API_KEY or add it to solace.toml, \
                 or use backend.kind = \"scripted\" for offline mode."
            ))?;
        Arc::new(OpenAiCompatBackend::new(
            &config.backend.base_url,
            api_key,
            &config.backend.model,
        ))
    } else {
        // Offline mode: classification always lands on supportive listening.
        Arc::new(ScriptedBackend::always(
            r#"{"intent": "therapy_support", "confidence": 0.8, "language": "en"}"#,
        ))
    };

    let intent_cache = Arc::new(TtlCache::new(config.cache.intent_ttl()));
    let response_cache = Arc::new(TtlCache::new(config.cache.response_ttl()));
    let template_cache = Arc::new(TtlCache::new(config.cache.template_ttl()));
    let sweeper = spawn_sweeper(template_cache.clone(), config.cache.sweep_interval());

    let mut detector = CrisisDetector::new();
    if online && config.guardrail.model_check_enabled {
        detector = detector.with_model_check(
            backend.clone(),
            config.pipeline.crisis_model_check_timeout(),
        );
    }

    let responder = CrisisResponder::new(
        HelplineDirectory::new().with_overrides(&config.guardrail.helpline_overrides),
    );

    let classifier = IntentClassifier::new(
        backend.clone(),
        intent_cache,
        config.pipeline.classify_timeout(),
    );

    let mut composer = Composer::new(
        TemplateStore::new(template_cache),
        TemplatePicker::from_entropy(),
    );
    if online {
        composer = composer.with_generative_opener(
            backend.clone(),
            response_cache,
            config.pipeline.compose_timeout(),
        );
    }

    let mut critic = Critic::new();
    if online {
        critic = critic.with_backend(backend.clone(), config.pipeline.critique_timeout());
    }

    let memory = Arc::new(ContextMemory::new(MemorySettings {
        max_turns: config.memory.max_turns,
        context_retention_days: config.memory.context_retention_days,
        crisis_retention_days: config.memory.crisis_retention_days,
        summary_staleness: std::time::Duration::from_secs(config.memory.summary_staleness_secs),
    }));

    let pipeline = TurnPipeline::new(
        detector,
        responder,
        classifier,
        Planner::new(),
        ToolDispatcher::new(
            Arc::new(solace_tools::default_registry()),
            config.pipeline.tool_timeout(),
        ),
        composer,
        critic,
        memory,
        config.pipeline.clone(),
    );

    Ok((Arc::new(pipeline), sweeper))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn offline_pipeline_builds_and_answers() {
        let mut config = AppConfig::default();
        config.backend.kind = "scripted".into();

        let (pipeline, sweeper) = build_pipeline(&config).unwrap();
        let response = pipeline
            .submit_turn("cli-test", "I've had a rough week", &[], None)
            .await
            .unwrap();
        assert!(!response.content.is_empty());
        sweeper.abort();
    }

    #[test]
    fn online_pipeline_requires_api_key() {
        let mut config = AppConfig::default();
        config.backend.kind = "openai_compat".into();
        config.backend.api_key = None;
        assert!(build_pipeline(&config).is_err());
    }
}
