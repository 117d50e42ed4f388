//! Synchronous single-tool dispatch under a bounded timeout.

use solace_core::plan::Plan;
use solace_core::tool::{ToolRegistry, ToolResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Executes the plan's single tool call, if any.
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    timeout: Duration,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// Dispatch the plan's tool call. `None` when the plan carries no
    /// tool. Failures and timeouts come back as a failed [`ToolResult`];
    /// they never abort the turn.
    pub async fn dispatch(&self, plan: &Plan) -> Option<ToolResult> {
        let invocation = plan.tool.as_ref()?;
        let start = std::time::Instant::now();

        let outcome = tokio::time::timeout(
            self.timeout,
            self.registry.call(invocation.name, invocation.args.clone()),
        )
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(Ok(data)) => {
                debug!(tool = %invocation.name, duration_ms, "Tool call succeeded");
                ToolResult::ok(data)
            }
            Ok(Err(e)) => {
                warn!(tool = %invocation.name, error = %e, duration_ms, "Tool call failed");
                ToolResult::failed(e.to_string())
            }
            Err(_) => {
                warn!(
                    tool = %invocation.name,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Tool call timed out"
                );
                ToolResult::failed(format!(
                    "{} timed out after {}ms",
                    invocation.name,
                    self.timeout.as_millis()
                ))
            }
        };

        Some(result)
    }
}
