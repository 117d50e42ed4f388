//! WellnessTool trait and the tool registry.
//!
//! Tools are the external collaborators the planner may consult:
//! check-in history, micro-habit suggestions, action plans, resource
//! lookup. The registry is keyed by the closed [`ToolName`] enum, so
//! there is no dynamic string lookup to go wrong. A tool failure never
//! blocks a turn: the dispatcher converts it into a failed
//! [`ToolResult`] and composition proceeds without tool data.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ToolError;
use crate::plan::ToolName;

/// The outcome of a tool dispatch. Transient: never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(data: serde_json::Value) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()) }
    }
}

/// One external tool collaborator.
#[async_trait]
pub trait WellnessTool: Send + Sync {
    /// Which registry slot this tool fills.
    fn name(&self) -> ToolName;

    /// What the tool does, for logs and prompt context.
    fn description(&self) -> &str;

    /// Execute with JSON arguments. Implementations validate their own
    /// arguments and return `ToolError::InvalidArguments` on bad input.
    async fn call(&self, args: serde_json::Value) -> std::result::Result<serde_json::Value, ToolError>;
}

/// A registry of the fixed tool set.
pub struct ToolRegistry {
    tools: HashMap<ToolName, Box<dyn WellnessTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: HashMap::new() }
    }

    /// Register a tool. Replaces any existing tool in the same slot.
    pub fn register(&mut self, tool: Box<dyn WellnessTool>) {
        self.tools.insert(tool.name(), tool);
    }

    pub fn get(&self, name: ToolName) -> Option<&dyn WellnessTool> {
        self.tools.get(&name).map(|t| t.as_ref())
    }

    /// Execute one call. `NotRegistered` when the slot is empty.
    pub async fn call(
        &self,
        name: ToolName,
        args: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, ToolError> {
        let tool = self
            .tools
            .get(&name)
            .ok_or_else(|| ToolError::NotRegistered(name.label().into()))?;
        tool.call(args).await
    }

    pub fn names(&self) -> Vec<ToolName> {
        self.tools.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedHabits;

    #[async_trait]
    impl WellnessTool for FixedHabits {
        fn name(&self) -> ToolName {
            ToolName::SuggestMicroHabits
        }

        fn description(&self) -> &str {
            "Suggest small habits for a stress domain"
        }

        async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
            let domain = args["domain"]
                .as_str()
                .ok_or_else(|| ToolError::InvalidArguments("missing 'domain'".into()))?;
            Ok(serde_json::json!([format!("practice {domain} wind-down")]))
        }
    }

    #[tokio::test]
    async fn register_and_call() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(FixedHabits));

        let out = registry
            .call(ToolName::SuggestMicroHabits, serde_json::json!({"domain": "sleep"}))
            .await
            .unwrap();
        assert!(out[0].as_str().unwrap().contains("sleep"));
    }

    #[tokio::test]
    async fn missing_slot_is_not_registered() {
        let registry = ToolRegistry::new();
        let err = registry
            .call(ToolName::FetchCheckins, serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotRegistered(_)));
    }

    #[tokio::test]
    async fn invalid_arguments_propagate() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(FixedHabits));
        let err = registry
            .call(ToolName::SuggestMicroHabits, serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn tool_result_constructors() {
        let ok = ToolResult::ok(serde_json::json!({"avg_wellness": 7.2}));
        assert!(ok.success);
        assert!(ok.error.is_none());

        let failed = ToolResult::failed("timed out");
        assert!(!failed.success);
        assert!(failed.data.is_none());
        assert_eq!(failed.error.as_deref(), Some("timed out"));
    }
}
