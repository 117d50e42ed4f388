//! Check-in history tool, a stub that returns deterministic data.
//!
//! In production this would query the check-in store. The stub derives
//! plausible wellness numbers from the user id so the planner and
//! composer can be tested end-to-end.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use solace_core::error::ToolError;
use solace_core::plan::ToolName;
use solace_core::tool::WellnessTool;

pub struct FetchCheckinsTool;

#[async_trait]
impl WellnessTool for FetchCheckinsTool {
    fn name(&self) -> ToolName {
        ToolName::FetchCheckins
    }

    fn description(&self) -> &str {
        "Fetch a user's recent wellness check-ins: average score, stress domains, last check-in date."
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let user_id = args["user_id"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("missing 'user_id'".into()))?;
        let days = args["days"].as_u64().unwrap_or(7).clamp(1, 90);

        let hash = stable_hash(user_id);
        let avg_wellness = 4.0 + ((hash % 50) as f64) / 10.0; // 4.0 to 8.9

        let all_domains = ["sleep", "work", "relationships", "health", "finances"];
        let mut stress_domains = Vec::new();
        for (i, domain) in all_domains.iter().enumerate() {
            if (hash >> i) & 1 == 1 {
                stress_domains.push(*domain);
            }
        }
        if stress_domains.is_empty() {
            stress_domains.push("sleep");
        }
        stress_domains.truncate(3);

        let last_checkin = Utc::now() - Duration::days((hash % 3) as i64);

        Ok(serde_json::json!({
            "avg_wellness": (avg_wellness * 10.0).round() / 10.0,
            "stress_domains": stress_domains,
            "last_checkin_date": last_checkin.format("%Y-%m-%d").to_string(),
            "window_days": days,
        }))
    }
}

fn stable_hash(input: &str) -> u32 {
    input
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32))
}
