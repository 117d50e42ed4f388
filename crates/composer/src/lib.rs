//! Structured reply composition.
//!
//! A composed reply always has the same layout: validation sentence(s),
//! a blank line, two to five bullet actions, a blank line, then a nudge
//! and call-to-action. Action content prefers tool data (capped at four
//! items) over the language-scoped template pools; template selection
//! goes through a seedable picker so tests are reproducible.
//!
//! Optionally, the opening validation can be delegated to the
//! language-model backend for a more personal touch, with generated
//! openers cached for five minutes keyed by a hash of the prompt. The
//! delegation is best-effort: any failure falls back to the template
//! pool, and the fixed layout invariant holds either way.

pub mod picker;
pub mod templates;

pub use picker::TemplatePicker;
pub use templates::{TemplateSet, TemplateStore};

use solace_cache::{stable_key, TtlCache};
use solace_core::backend::{BackendRequest, LanguageModel};
use solace_core::context::ContextSummary;
use solace_core::intent::Intent;
use solace_core::language::Language;
use solace_core::reply::{ComposedReply, MAX_ACTIONS, MIN_ACTIONS};
use solace_core::tool::ToolResult;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// Tool-derived actions are capped here; templates fill the rest.
const MAX_TOOL_ACTIONS: usize = 4;

/// Default number of template actions when no tool data is available.
const DEFAULT_TEMPLATE_ACTIONS: usize = 3;

struct GenerativeOpener {
    backend: Arc<dyn LanguageModel>,
    cache: Arc<TtlCache<String>>,
    timeout: Duration,
}

pub struct Composer {
    templates: TemplateStore,
    picker: Mutex<TemplatePicker>,
    opener: Option<GenerativeOpener>,
}

impl Composer {
    pub fn new(templates: TemplateStore, picker: TemplatePicker) -> Self {
        Self {
            templates,
            picker: Mutex::new(picker),
            opener: None,
        }
    }

    /// Delegate the opening validation sentence to the backend, with a
    /// response cache (5 minute TTL recommended) keyed by prompt hash.
    pub fn with_generative_opener(
        mut self,
        backend: Arc<dyn LanguageModel>,
        cache: Arc<TtlCache<String>>,
        timeout: Duration,
    ) -> Self {
        self.opener = Some(GenerativeOpener { backend, cache, timeout });
        self
    }

    /// Compose a structured reply. Never fails: the worst case is a
    /// fully template-driven reply.
    pub async fn compose(
        &self,
        intent: Intent,
        tool_result: Option<&ToolResult>,
        message: &str,
        language: Language,
        user_context: Option<&ContextSummary>,
    ) -> ComposedReply {
        let set = self.templates.get(intent, language).await;

        let validation = match self.generate_opener(message, language).await {
            Some(opener) => opener,
            None => self.pick(&set.validations),
        };

        let actions = self.build_actions(&set, tool_result, user_context);
        let nudge = self.pick(&set.nudges);
        let cta = self.pick(&set.ctas);

        debug!(intent = %intent, actions = actions.len(), "Reply composed");
        ComposedReply::assemble(validation, actions, nudge, cta)
    }

    fn pick(&self, pool: &[String]) -> String {
        self.picker
            .lock()
            .expect("picker lock poisoned")
            .pick(pool)
            .to_string()
    }

    fn build_actions(
        &self,
        set: &TemplateSet,
        tool_result: Option<&ToolResult>,
        user_context: Option<&ContextSummary>,
    ) -> Vec<String> {
        let mut actions: Vec<String> = tool_result
            .filter(|r| r.success)
            .and_then(|r| r.data.as_ref())
            .map(|data| actions_from_tool(data))
            .unwrap_or_default();

        actions.truncate(MAX_TOOL_ACTIONS);

        if actions.len() < MIN_ACTIONS {
            let brief = user_context.map(|c| c.preferences.prefers_brief).unwrap_or(false);
            let want = if actions.is_empty() {
                if brief { MIN_ACTIONS } else { DEFAULT_TEMPLATE_ACTIONS }
            } else {
                MIN_ACTIONS - actions.len()
            };
            let padding = self
                .picker
                .lock()
                .expect("picker lock poisoned")
                .pick_many(&set.actions, want);
            for p in padding {
                if !actions.iter().any(|a| a == p) {
                    actions.push(p.to_string());
                }
            }
        }

        actions.truncate(MAX_ACTIONS);
        actions
    }

    /// Best-effort personalized opener. `None` means use templates.
    async fn generate_opener(&self, message: &str, language: Language) -> Option<String> {
        let opener = self.opener.as_ref()?;

        let system = format!(
            "Write exactly one warm, empathetic opening sentence (at most 30 words) \
             in language '{}' for a wellness companion replying to the user. \
             No advice, no lists, no quotes.",
            language.code()
        );
        let request = BackendRequest::prompt(system.as_str(), message, 0.7).with_max_tokens(64);
        let key = stable_key(&[system.as_str(), message]);

        if let Some(cached) = opener.cache.get(&key).await {
            return Some(cached);
        }

        match tokio::time::timeout(opener.timeout, opener.backend.complete(request)).await {
            Ok(Ok(response)) => {
                let text = response.content.trim().to_string();
                if text.is_empty() {
                    return None;
                }
                opener.cache.insert(key, text.clone()).await;
                Some(text)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Opener generation failed; using template");
                None
            }
            Err(_) => {
                warn!("Opener generation timed out; using template");
                None
            }
        }
    }
}

/// Turn tool output into bullet actions. Shapes handled: plain string
/// arrays (micro-habits), {steps, timebox} (action plans), check-in
/// summaries, and {resources} lists. Anything else contributes nothing
/// and templates take over.
fn actions_from_tool(data: &serde_json::Value) -> Vec<String> {
    if let Some(items) = data.as_array() {
        return items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.to_string())
            .collect();
    }

    if let Some(steps) = data["steps"].as_array() {
        let timeboxes = data["timebox"].as_array();
        return steps
            .iter()
            .enumerate()
            .filter_map(|(i, step)| {
                let step = step.as_str()?;
                let timebox = timeboxes
                    .and_then(|t| t.get(i))
                    .and_then(|t| t.as_str());
                Some(match timebox {
                    Some(tb) => format!("{step} ({tb})"),
                    None => step.to_string(),
                })
            })
            .collect();
    }

    if let Some(avg) = data["avg_wellness"].as_f64() {
        let mut actions = vec![format!(
            "Notice that your average wellness score lately is {avg:.1} out of 10"
        )];
        if let Some(domains) = data["stress_domains"].as_array() {
            let names: Vec<&str> = domains.iter().filter_map(|d| d.as_str()).collect();
            if !names.is_empty() {
                actions.push(format!(
                    "Your check-ins point to {} as the main pressure point(s)",
                    names.join(" and ")
                ));
            }
        }
        if let Some(date) = data["last_checkin_date"].as_str() {
            actions.push(format!(
                "Your last check-in was {date}; a quick one today keeps the picture fresh"
            ));
        }
        return actions;
    }

    if let Some(resources) = data["resources"].as_array() {
        return resources
            .iter()
            .filter_map(|r| {
                let title = r["title"].as_str()?;
                let url = r["url"].as_str().unwrap_or("");
                Some(if url.is_empty() {
                    format!("Read \"{title}\"")
                } else {
                    format!("Read \"{title}\": {url}")
                })
            })
            .collect();
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use solace_backends::ScriptedBackend;
    use solace_core::error::BackendError;

    fn composer() -> Composer {
        composer_seeded(42)
    }

    fn composer_seeded(seed: u64) -> Composer {
        Composer::new(
            TemplateStore::new(Arc::new(TtlCache::new(Duration::from_secs(86_400)))),
            TemplatePicker::seeded(seed),
        )
    }

    #[tokio::test]
    async fn template_reply_has_fixed_layout() {
        let reply = composer()
            .compose(Intent::TherapySupport, None, "I feel stuck", Language::En, None)
            .await;

        let bullets = reply.bullet_count();
        assert!((MIN_ACTIONS..=MAX_ACTIONS).contains(&bullets));
        assert!(reply.full_response.contains("\n\n- "));
        assert!(reply.full_response.ends_with(&format!("{} {}", reply.nudge, reply.cta)));
    }

    #[tokio::test]
    async fn seeded_composition_is_reproducible() {
        let a = composer_seeded(7)
            .compose(Intent::QuickTip, None, "tips?", Language::En, None)
            .await;
        let b = composer_seeded(7)
            .compose(Intent::QuickTip, None, "tips?", Language::En, None)
            .await;
        assert_eq!(a.full_response, b.full_response);
    }

    #[tokio::test]
    async fn tool_habits_take_priority_and_cap_at_four() {
        let result = ToolResult::ok(serde_json::json!([
            "habit one", "habit two", "habit three", "habit four", "habit five"
        ]));
        let reply = composer()
            .compose(Intent::QuickTip, Some(&result), "sleep tips?", Language::En, None)
            .await;

        assert_eq!(reply.actions.len(), 4);
        assert_eq!(reply.actions[0], "habit one");
        assert!(!reply.actions.contains(&"habit five".to_string()));
    }

    #[tokio::test]
    async fn checkin_data_is_referenced_in_actions() {
        let result = ToolResult::ok(serde_json::json!({
            "avg_wellness": 7.2,
            "stress_domains": ["sleep", "work"],
            "last_checkin_date": "2026-08-01",
        }));
        let reply = composer()
            .compose(Intent::TherapySupport, Some(&result), "how am I doing?", Language::En, None)
            .await;

        assert!(reply.full_response.contains("7.2"));
        assert!(reply.actions.iter().any(|a| a.contains("sleep and work")));
    }

    #[tokio::test]
    async fn plan_steps_carry_timeboxes() {
        let result = ToolResult::ok(serde_json::json!({
            "steps": ["clarify the goal", "pick the first piece"],
            "timebox": ["this morning", "midday"],
        }));
        let reply = composer()
            .compose(Intent::PlanBuilder, Some(&result), "plan my day", Language::En, None)
            .await;

        assert!(reply.actions[0].contains("(this morning)"));
        assert_eq!(reply.actions.len(), 2);
    }

    #[tokio::test]
    async fn single_tool_item_is_padded_to_minimum() {
        let result = ToolResult::ok(serde_json::json!({
            "resources": [{"title": "Early signs of burnout", "url": "https://x", "kind": "article"}],
        }));
        let reply = composer()
            .compose(Intent::QuickTip, Some(&result), "burnout reading?", Language::En, None)
            .await;

        assert!(reply.actions.len() >= MIN_ACTIONS);
        assert!(reply.actions[0].contains("Early signs of burnout"));
    }

    #[tokio::test]
    async fn failed_tool_result_uses_templates() {
        let result = ToolResult::failed("tool timed out");
        let reply = composer()
            .compose(Intent::QuickTip, Some(&result), "tips?", Language::En, None)
            .await;

        assert!((MIN_ACTIONS..=MAX_ACTIONS).contains(&reply.actions.len()));
    }

    #[tokio::test]
    async fn unlocalized_language_falls_back_to_english_pool() {
        let reply = composer()
            .compose(Intent::QuickTip, None, "tipps bitte", Language::De, None)
            .await;
        assert!(reply.validation.contains("question") || reply.validation.contains("Glad you"));
    }

    #[tokio::test]
    async fn spanish_reply_uses_spanish_pool() {
        let reply = composer()
            .compose(Intent::TherapySupport, None, "me siento mal", Language::Es, None)
            .await;
        assert!(reply.validation.contains("Gracias") || reply.validation.contains("difícil"));
    }

    #[tokio::test]
    async fn generative_opener_is_used_and_cached() {
        let backend = Arc::new(ScriptedBackend::new(vec!["I'm really glad you reached out today."]));
        let scripted = backend.clone();
        let cache = Arc::new(TtlCache::new(Duration::from_secs(300)));
        let composer = composer().with_generative_opener(backend, cache, Duration::from_secs(1));

        let first = composer
            .compose(Intent::TherapySupport, None, "rough day", Language::En, None)
            .await;
        assert_eq!(first.validation, "I'm really glad you reached out today.");

        // Same prompt again: served from the response cache.
        let second = composer
            .compose(Intent::TherapySupport, None, "rough day", Language::En, None)
            .await;
        assert_eq!(second.validation, first.validation);
        assert_eq!(scripted.call_count(), 1);
    }

    #[tokio::test]
    async fn opener_failure_falls_back_to_template() {
        let backend = Arc::new(ScriptedBackend::failing(BackendError::Network("down".into())));
        let cache = Arc::new(TtlCache::new(Duration::from_secs(300)));
        let composer = composer().with_generative_opener(backend, cache, Duration::from_secs(1));

        let reply = composer
            .compose(Intent::TherapySupport, None, "rough day", Language::En, None)
            .await;
        assert!(!reply.validation.is_empty());
        assert!((MIN_ACTIONS..=MAX_ACTIONS).contains(&reply.actions.len()));
    }

    #[test]
    fn unknown_tool_shape_contributes_nothing() {
        let actions = actions_from_tool(&serde_json::json!({"weird": true}));
        assert!(actions.is_empty());
    }
}
