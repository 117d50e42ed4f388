//! The deterministic planning rule table.

use solace_core::context::ContextSummary;
use solace_core::intent::Intent;
use solace_core::language::Language;
use solace_core::plan::{Horizon, Plan, Strategy, ToolName};
use tracing::debug;

/// Turns recorded before therapy support consults check-in history.
const WARM_HISTORY_TURNS: u32 = 3;

/// Stateless planner: intent + message heuristics in, plan out.
pub struct Planner;

impl Planner {
    pub fn new() -> Self {
        Self
    }

    /// Build the plan for a safe-path turn.
    pub fn plan(
        &self,
        intent: Intent,
        message: &str,
        user_id: &str,
        language: Language,
        context: Option<&ContextSummary>,
    ) -> Plan {
        let plan = match intent {
            Intent::Crisis => Plan::crisis_override(),
            Intent::QuickTip => self.plan_quick_tip(message, language),
            Intent::PlanBuilder => self.plan_builder(message),
            Intent::TherapySupport => self.plan_therapy(message, user_id, language, context),
            Intent::SmallTalk => Plan::bare(Intent::SmallTalk, Strategy::CasualRapport),
        };

        debug!(
            intent = %plan.intent,
            strategy = ?plan.strategy,
            tool = ?plan.tool.as_ref().map(|t| t.name),
            "Plan built"
        );
        plan
    }

    fn plan_quick_tip(&self, message: &str, language: Language) -> Plan {
        if wants_resources(message) {
            return Plan::with_tool(
                Intent::QuickTip,
                Strategy::QuickAdvice,
                ToolName::LookupResources,
                serde_json::json!({ "topic": extract_topic(message), "locale": language.code() }),
            );
        }

        match extract_domain(message) {
            Some(domain) => Plan::with_tool(
                Intent::QuickTip,
                Strategy::QuickAdvice,
                ToolName::SuggestMicroHabits,
                serde_json::json!({ "domain": domain }),
            ),
            None => Plan::bare(Intent::QuickTip, Strategy::QuickAdvice),
        }
    }

    fn plan_builder(&self, message: &str) -> Plan {
        let horizon = extract_horizon(message);
        let goal = extract_goal(message);
        Plan::with_tool(
            Intent::PlanBuilder,
            Strategy::StructuredPlanning,
            ToolName::CreateActionPlan,
            serde_json::json!({ "goal": goal, "horizon": horizon.label() }),
        )
    }

    fn plan_therapy(
        &self,
        message: &str,
        user_id: &str,
        language: Language,
        context: Option<&ContextSummary>,
    ) -> Plan {
        if wants_resources(message) {
            return Plan::with_tool(
                Intent::TherapySupport,
                Strategy::SupportiveListening,
                ToolName::LookupResources,
                serde_json::json!({ "topic": extract_topic(message), "locale": language.code() }),
            );
        }

        // First sessions stay tool-free; with a warm history the
        // composer can reflect the user's own check-in numbers back.
        let warm = context
            .map(|c| c.recent_intents.iter().map(|f| f.count).sum::<u32>() >= WARM_HISTORY_TURNS)
            .unwrap_or(false);

        if warm {
            Plan::with_tool(
                Intent::TherapySupport,
                Strategy::SupportiveListening,
                ToolName::FetchCheckins,
                serde_json::json!({ "user_id": user_id, "days": 7 }),
            )
        } else {
            Plan::bare(Intent::TherapySupport, Strategy::SupportiveListening)
        }
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

fn wants_resources(message: &str) -> bool {
    let m = message.to_lowercase();
    ["resource", "article", "something to read", "recommend a", "recursos", "artículo"]
        .iter()
        .any(|k| m.contains(k))
}

/// Stress-domain extraction for micro-habit suggestions.
fn extract_domain(message: &str) -> Option<&'static str> {
    let m = message.to_lowercase();
    let table: [(&[&str], &str); 5] = [
        (&["sleep", "tired", "insomnia", "awake at night"], "sleep"),
        (&["exercise", "workout", "gym", "move more"], "exercise"),
        (&["focus", "concentrate", "distracted", "procrastinat"], "focus"),
        (&["eat", "food", "nutrition", "meal"], "nutrition"),
        (&["stress", "overwhelm", "tense", "pressure"], "stress"),
    ];
    for (keywords, domain) in table {
        if keywords.iter().any(|k| m.contains(k)) {
            return Some(domain);
        }
    }
    None
}

/// Topic extraction for resource lookup.
fn extract_topic(message: &str) -> &'static str {
    let m = message.to_lowercase();
    if m.contains("anxi") || m.contains("panic") || m.contains("worry") {
        "anxiety"
    } else if m.contains("sleep") || m.contains("insomnia") {
        "sleep"
    } else if m.contains("burnout") || m.contains("burned out") || m.contains("exhausted") {
        "burnout"
    } else {
        "general"
    }
}

/// Horizon extraction: explicit same-day phrasing wins, else a week.
fn extract_horizon(message: &str) -> Horizon {
    let m = message.to_lowercase();
    if ["today", "tonight", "right now", "this morning", "hoy"]
        .iter()
        .any(|k| m.contains(k))
    {
        Horizon::Today
    } else {
        Horizon::Week
    }
}

/// Goal extraction: well-known situations get a canonical goal, the
/// rest use the message itself, trimmed to a headline.
fn extract_goal(message: &str) -> String {
    let m = message.to_lowercase();
    if m.contains("resign") || m.contains("quit my job") || m.contains("leave my job") {
        return "decide on your next step at work".into();
    }
    if m.contains("job") || m.contains("career") || m.contains("interview") {
        return "move your work situation forward".into();
    }
    if m.contains("sleep") {
        return "improve your sleep".into();
    }

    let trimmed = message.trim();
    let total = trimmed.chars().count();
    let mut goal: String = trimmed.chars().take(80).collect();
    if total > 80 {
        goal.push('…');
    }
    goal
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use solace_core::context::{IntentFrequency, Preferences, WellnessTrend};

    fn planner() -> Planner {
        Planner::new()
    }

    fn warm_context() -> ContextSummary {
        ContextSummary {
            recent_intents: vec![
                IntentFrequency { intent: Intent::TherapySupport, count: 3 },
                IntentFrequency { intent: Intent::QuickTip, count: 1 },
            ],
            wellness_trend: WellnessTrend::Stable,
            crisis_history: vec![],
            preferences: Preferences::default(),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn crisis_plan_has_no_tool() {
        let plan = planner().plan(Intent::Crisis, "anything", "u1", Language::En, None);
        assert!(!plan.tool_needed());
        assert_eq!(plan.strategy, Strategy::CrisisOverride);
    }

    #[test]
    fn sleep_tip_selects_micro_habits() {
        let plan = planner().plan(
            Intent::QuickTip,
            "any tips? I can't sleep lately",
            "u1",
            Language::En,
            None,
        );
        let tool = plan.tool.expect("tool expected");
        assert_eq!(tool.name, ToolName::SuggestMicroHabits);
        assert_eq!(tool.args["domain"], "sleep");
    }

    #[test]
    fn exercise_tip_extracts_domain() {
        let plan = planner().plan(
            Intent::QuickTip,
            "I want to exercise more but never manage",
            "u1",
            Language::En,
            None,
        );
        assert_eq!(plan.tool.unwrap().args["domain"], "exercise");
    }

    #[test]
    fn vague_tip_goes_without_tool() {
        let plan = planner().plan(Intent::QuickTip, "any advice?", "u1", Language::En, None);
        assert!(!plan.tool_needed());
        assert_eq!(plan.strategy, Strategy::QuickAdvice);
    }

    #[test]
    fn resign_builds_work_goal_plan() {
        let plan = planner().plan(
            Intent::PlanBuilder,
            "I think I should resign, help me figure this out this week",
            "u1",
            Language::En,
            None,
        );
        let tool = plan.tool.expect("tool expected");
        assert_eq!(tool.name, ToolName::CreateActionPlan);
        assert_eq!(tool.args["goal"], "decide on your next step at work");
        assert_eq!(tool.args["horizon"], "week");
    }

    #[test]
    fn today_phrasing_shrinks_horizon() {
        let plan = planner().plan(
            Intent::PlanBuilder,
            "I need a plan for my job interview today",
            "u1",
            Language::En,
            None,
        );
        assert_eq!(plan.tool.unwrap().args["horizon"], "today");
    }

    #[test]
    fn cold_therapy_support_is_tool_free() {
        let plan = planner().plan(
            Intent::TherapySupport,
            "I just feel off lately",
            "u1",
            Language::En,
            None,
        );
        assert!(!plan.tool_needed());
        assert_eq!(plan.strategy, Strategy::SupportiveListening);
    }

    #[test]
    fn warm_therapy_support_consults_checkins() {
        let ctx = warm_context();
        let plan = planner().plan(
            Intent::TherapySupport,
            "I just feel off lately",
            "u-9",
            Language::En,
            Some(&ctx),
        );
        let tool = plan.tool.expect("tool expected");
        assert_eq!(tool.name, ToolName::FetchCheckins);
        assert_eq!(tool.args["user_id"], "u-9");
    }

    #[test]
    fn resource_phrasing_selects_lookup() {
        let plan = planner().plan(
            Intent::QuickTip,
            "got an article about anxiety you'd recommend?",
            "u1",
            Language::En,
            None,
        );
        let tool = plan.tool.expect("tool expected");
        assert_eq!(tool.name, ToolName::LookupResources);
        assert_eq!(tool.args["topic"], "anxiety");
        assert_eq!(tool.args["locale"], "en");
    }

    #[test]
    fn small_talk_is_bare() {
        let plan = planner().plan(Intent::SmallTalk, "hey!", "u1", Language::En, None);
        assert!(!plan.tool_needed());
        assert_eq!(plan.strategy, Strategy::CasualRapport);
    }

    #[test]
    fn long_free_goal_is_truncated() {
        let message = "a".repeat(200);
        let goal = extract_goal(&message);
        assert!(goal.chars().count() <= 81);
        assert!(goal.ends_with('…'));
    }
}
