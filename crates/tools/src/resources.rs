//! Curated resource lookup by topic and locale.

use async_trait::async_trait;
use solace_core::error::ToolError;
use solace_core::plan::ToolName;
use solace_core::tool::WellnessTool;

pub struct LookupResourcesTool;

#[async_trait]
impl WellnessTool for LookupResourcesTool {
    fn name(&self) -> ToolName {
        ToolName::LookupResources
    }

    fn description(&self) -> &str {
        "Look up curated wellness resources (articles, exercises, audio) for a topic."
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let topic = args["topic"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("missing 'topic'".into()))?;
        let locale = args["locale"].as_str().unwrap_or("en");

        let resources = match topic {
            "anxiety" => vec![
                resource(
                    "Grounding techniques for anxious moments",
                    "https://resources.solace.app/anxiety/grounding",
                    "exercise",
                    "Five short grounding practices you can do anywhere.",
                ),
                resource(
                    "Understanding the anxiety loop",
                    "https://resources.solace.app/anxiety/loop",
                    "article",
                    "How anxious thoughts sustain themselves, and where to interrupt.",
                ),
            ],
            "sleep" => vec![
                resource(
                    "Winding down: a 20-minute routine",
                    "https://resources.solace.app/sleep/wind-down",
                    "article",
                    "A realistic pre-sleep routine for busy evenings.",
                ),
                resource(
                    "Body scan for sleep",
                    "https://resources.solace.app/sleep/body-scan",
                    "audio",
                    "A 12-minute guided body scan.",
                ),
            ],
            "burnout" => vec![
                resource(
                    "Early signs of burnout",
                    "https://resources.solace.app/burnout/signs",
                    "article",
                    "What burnout looks like before it's obvious.",
                ),
            ],
            _ => vec![
                resource(
                    "Getting started with daily check-ins",
                    "https://resources.solace.app/basics/check-ins",
                    "article",
                    "Why two minutes of daily reflection compounds.",
                ),
            ],
        };

        Ok(serde_json::json!({
            "locale": locale,
            "resources": resources,
        }))
    }
}

fn resource(title: &str, url: &str, kind: &str, description: &str) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "url": url,
        "kind": kind,
        "description": description,
    })
}
