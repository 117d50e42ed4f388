//! Action plan builder: goal plus horizon in, steps plus timeboxes out.

use async_trait::async_trait;
use solace_core::error::ToolError;
use solace_core::plan::ToolName;
use solace_core::tool::WellnessTool;

pub struct CreateActionPlanTool;

#[async_trait]
impl WellnessTool for CreateActionPlanTool {
    fn name(&self) -> ToolName {
        ToolName::CreateActionPlan
    }

    fn description(&self) -> &str {
        "Build a small action plan for a goal over a 'today' or 'week' horizon."
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let goal = args["goal"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("missing 'goal'".into()))?;
        let horizon = args["horizon"].as_str().unwrap_or("today");

        let (steps, timebox): (Vec<String>, Vec<&str>) = match horizon {
            "week" => (
                vec![
                    format!("Write down what '{goal}' looks like when it's done"),
                    "Break it into three smaller pieces".to_string(),
                    "Do the smallest piece first".to_string(),
                    "Check in with yourself mid-week and adjust".to_string(),
                    "Review what worked at the end of the week".to_string(),
                ],
                vec!["Monday", "Monday", "Tuesday", "Thursday", "Sunday"],
            ),
            _ => (
                vec![
                    format!("Spend 10 minutes getting clear on '{goal}'"),
                    "Pick the single smallest next step".to_string(),
                    "Do that step, then stop and note how it went".to_string(),
                ],
                vec!["this morning", "midday", "this evening"],
            ),
        };

        Ok(serde_json::json!({
            "steps": steps,
            "timebox": timebox,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn today_horizon_gives_three_steps() {
        let tool = CreateActionPlanTool;
        let out = tool
            .call(serde_json::json!({"goal": "update my resume", "horizon": "today"}))
            .await
            .unwrap();
        let steps = out["steps"].as_array().unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps.len(), out["timebox"].as_array().unwrap().len());
        assert!(steps[0].as_str().unwrap().contains("update my resume"));
    }

    #[tokio::test]
    async fn week_horizon_gives_five_steps() {
        let tool = CreateActionPlanTool;
        let out = tool
            .call(serde_json::json!({"goal": "find a new job", "horizon": "week"}))
            .await
            .unwrap();
        assert_eq!(out["steps"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn missing_goal_is_invalid() {
        let tool = CreateActionPlanTool;
        assert!(tool.call(serde_json::json!({"horizon": "week"})).await.is_err());
    }
}
