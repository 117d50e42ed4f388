//! Planning and tool dispatch.
//!
//! [`Planner`] maps an intent plus substring heuristics to a strategy
//! and at most one tool invocation, through a deterministic rule table
//! (no model calls). [`ToolDispatcher`] executes that single call
//! synchronously under its own timeout; a tool failure never blocks or
//! aborts the turn, it just means composition proceeds without tool
//! data.

pub mod dispatch;
pub mod rules;

pub use dispatch::ToolDispatcher;
pub use rules::Planner;
