//! Multi-agent task coordination.

pub mod planner;

pub use planner::{CoordinationPlan, CoordinationPlanner};
