//! Budget-aware multi-category trip search.

pub mod budget;
pub mod orchestrator;

pub use budget::BudgetAllocation;
pub use orchestrator::{OrchestratorConfig, SearchOrchestrator, TripPlan, TripRequest};
