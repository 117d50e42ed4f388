//! Micro-habit suggestions, keyed by stress domain.

use async_trait::async_trait;
use solace_core::error::ToolError;
use solace_core::plan::ToolName;
use solace_core::tool::WellnessTool;

pub struct SuggestMicroHabitsTool;

#[async_trait]
impl WellnessTool for SuggestMicroHabitsTool {
    fn name(&self) -> ToolName {
        ToolName::SuggestMicroHabits
    }

    fn description(&self) -> &str {
        "Suggest small, concrete habits for a stress domain (sleep, exercise, stress, focus, nutrition)."
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let domain = args["domain"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("missing 'domain'".into()))?;

        let habits: Vec<&str> = match domain {
            "sleep" => vec![
                "Set a phone curfew 30 minutes before bed",
                "Keep the same wake-up time, even on weekends",
                "Dim the lights an hour before sleeping",
                "Write tomorrow's top task down before bed",
            ],
            "exercise" => vec![
                "Take a 10-minute walk after lunch",
                "Do 5 minutes of stretching when you wake up",
                "Take the stairs once a day",
            ],
            "stress" => vec![
                "Try one minute of slow breathing between meetings",
                "Step outside for two minutes of daylight",
                "Write down the one thing worrying you most",
            ],
            "focus" => vec![
                "Work in 25-minute blocks with 5-minute breaks",
                "Silence notifications for your first hour",
                "Pick tomorrow's first task before ending today",
            ],
            "nutrition" => vec![
                "Keep a glass of water on your desk",
                "Add one piece of fruit to your morning",
                "Eat lunch away from your screen",
            ],
            _ => vec![
                "Take three slow breaths right now",
                "Drink a glass of water",
                "Step away from your screen for two minutes",
            ],
        };

        Ok(serde_json::json!(habits))
    }
}
