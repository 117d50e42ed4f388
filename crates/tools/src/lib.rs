//! Tool collaborator implementations for Solace.
//!
//! The four external collaborators the planner may consult. These are
//! stubs that return deterministic, plausible data so the pipeline can
//! be exercised end-to-end without network access; production
//! deployments swap in real implementations behind the same
//! [`solace_core::WellnessTool`] trait.

pub mod action_plan;
pub mod checkins;
pub mod micro_habits;
pub mod resources;

pub use action_plan::CreateActionPlanTool;
pub use checkins::FetchCheckinsTool;
pub use micro_habits::SuggestMicroHabitsTool;
pub use resources::LookupResourcesTool;

use solace_core::tool::ToolRegistry;

/// Create a registry with all four collaborators.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(FetchCheckinsTool));
    registry.register(Box::new(SuggestMicroHabitsTool));
    registry.register(Box::new(CreateActionPlanTool));
    registry.register(Box::new(LookupResourcesTool));
    registry
}
