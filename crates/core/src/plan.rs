//! Plans and the closed tool union.
//!
//! Tools are not looked up by ad-hoc string name: [`ToolName`] is a
//! closed enum over the fixed set of collaborators, so a plan that
//! carries a tool always names a real one. A [`Plan`] either has a
//! [`ToolInvocation`] or it does not; there is no way to express
//! "tool needed but unnamed".

use serde::{Deserialize, Serialize};

use crate::intent::Intent;

/// The fixed set of external tool collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    FetchCheckins,
    SuggestMicroHabits,
    CreateActionPlan,
    LookupResources,
}

impl ToolName {
    pub fn label(&self) -> &'static str {
        match self {
            ToolName::FetchCheckins => "fetch_checkins",
            ToolName::SuggestMicroHabits => "suggest_micro_habits",
            ToolName::CreateActionPlan => "create_action_plan",
            ToolName::LookupResources => "lookup_resources",
        }
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Planning horizon for action plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizon {
    Today,
    Week,
}

impl Horizon {
    pub fn label(&self) -> &'static str {
        match self {
            Horizon::Today => "today",
            Horizon::Week => "week",
        }
    }
}

/// How the composer should shape the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Open-ended, validating, few directives
    SupportiveListening,
    /// One concrete suggestion, short
    QuickAdvice,
    /// Stepwise plan with timeboxes
    StructuredPlanning,
    /// Fixed safety response; bypasses composer and critic
    CrisisOverride,
    /// Light, friendly
    CasualRapport,
}

/// A tool call the planner selected, with its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: ToolName,
    pub args: serde_json::Value,
}

/// The planner's output for one safe-path turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub intent: Intent,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolInvocation>,

    pub strategy: Strategy,
}

impl Plan {
    /// A plan with no tool call.
    pub fn bare(intent: Intent, strategy: Strategy) -> Self {
        Self { intent, tool: None, strategy }
    }

    /// A plan carrying one tool invocation. Crisis intent never takes a
    /// tool; the request is ignored and a bare override plan returned.
    pub fn with_tool(intent: Intent, strategy: Strategy, name: ToolName, args: serde_json::Value) -> Self {
        if intent == Intent::Crisis {
            return Self::crisis_override();
        }
        Self {
            intent,
            tool: Some(ToolInvocation { name, args }),
            strategy,
        }
    }

    /// The fixed crisis plan: no tool, override strategy.
    pub fn crisis_override() -> Self {
        Self {
            intent: Intent::Crisis,
            tool: None,
            strategy: Strategy::CrisisOverride,
        }
    }

    pub fn tool_needed(&self) -> bool {
        self.tool.is_some()
    }
}
