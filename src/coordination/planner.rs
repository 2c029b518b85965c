//! Coordination planner: capability to agent assignment for multi-agent tasks.
//!
//! Planning never fails: a capability with no live provider is assigned
//! `None`, listed in `missing_capabilities`, and priced into the success
//! probability instead of aborting the plan.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::discovery::AvailabilityProbe;
use crate::protocol::CoordinateRequest;
use crate::registry::{AgentRecord, AgentRegistry};

/// Per-agent reliability assumed when estimating plan success.
const AGENT_RELIABILITY: f64 = 0.95;

/// Latency assumed for agents that have not reported one, so they sort last.
const UNKNOWN_LATENCY_MS: u64 = 1_000;

/// Assignment of capabilities to concrete agents for one task.
#[derive(Debug, Clone, Serialize)]
pub struct CoordinationPlan {
    pub plan_id: Uuid,
    pub task_type: String,
    pub required_capabilities: Vec<String>,
    /// One entry per required capability; `None` marks a gap.
    pub assignment: BTreeMap<String, Option<AgentRecord>>,
    pub execution_order: Vec<String>,
    pub missing_capabilities: Vec<String>,
    /// `reliability^assigned`, 0.0 when nothing could be assigned.
    pub success_probability: f64,
    pub estimated_duration_ms: u64,
}

pub struct CoordinationPlanner {
    registry: Arc<AgentRegistry>,
    liveness: Option<Arc<dyn AvailabilityProbe>>,
}

impl CoordinationPlanner {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self {
            registry,
            liveness: None,
        }
    }

    /// Add a secondary liveness check applied to index candidates before
    /// selection. Without one, registry status alone decides availability.
    pub fn with_liveness(mut self, probe: Arc<dyn AvailabilityProbe>) -> Self {
        self.liveness = Some(probe);
        self
    }

    /// Assemble an execution plan for a task. Infallible by design.
    pub async fn plan(&self, request: &CoordinateRequest) -> CoordinationPlan {
        let required = required_capabilities(&request.task_type);
        info!(
            "planning task '{}' requiring {:?}",
            request.task_type, required
        );

        let snapshot = self.registry.snapshot().await;
        let mut assignment: BTreeMap<String, Option<AgentRecord>> = BTreeMap::new();
        let mut missing = Vec::new();

        for capability in &required {
            let mut candidates: Vec<AgentRecord> = snapshot
                .find_by_capability(capability)
                .into_iter()
                .cloned()
                .collect();

            if let Some(probe) = &self.liveness {
                let mut live = Vec::with_capacity(candidates.len());
                for candidate in candidates {
                    if probe.is_available(&candidate.base_url).await {
                        live.push(candidate);
                    } else {
                        debug!(
                            "candidate {} for {} failed the liveness check",
                            candidate.id, capability
                        );
                    }
                }
                candidates = live;
            }

            let selected = select_best_agent(candidates, &request.preferred_agents);
            if selected.is_none() {
                missing.push(capability.clone());
            }
            assignment.insert(capability.clone(), selected);
        }

        let assigned = assignment.values().filter(|a| a.is_some()).count();
        let plan = CoordinationPlan {
            plan_id: Uuid::new_v4(),
            task_type: request.task_type.clone(),
            execution_order: execution_order(&request.task_type, &required),
            estimated_duration_ms: estimated_duration_ms(&required),
            success_probability: success_probability(assigned),
            required_capabilities: required,
            assignment,
            missing_capabilities: missing,
        };

        info!(
            "plan {} for '{}': {}/{} capabilities assigned, p(success)={:.3}",
            plan.plan_id,
            plan.task_type,
            assigned,
            plan.required_capabilities.len(),
            plan.success_probability
        );
        plan
    }
}

/// Static task→capability table; unknown task types get the generic fallback.
fn required_capabilities(task_type: &str) -> Vec<String> {
    let capabilities: &[&str] = match task_type {
        "comprehensive_trip_planning" => &[
            "flight_search",
            "hotel_search",
            "activity_search",
            "itinerary_generation",
        ],
        "budget_optimization" => &["budget_negotiation", "price_optimization", "cost_analysis"],
        "disruption_handling" => &[
            "disruption_handling",
            "alternative_planning",
            "real_time_updates",
        ],
        "itinerary_generation" => &[
            "itinerary_generation",
            "schedule_optimization",
            "ai_recommendations",
        ],
        _ => &["general_travel_assistance"],
    };
    capabilities.iter().map(|c| c.to_string()).collect()
}

/// Static per-task ordering; unrecognized tasks run capabilities in
/// declaration order.
fn execution_order(task_type: &str, required: &[String]) -> Vec<String> {
    match task_type {
        "comprehensive_trip_planning" => vec![
            "flight_search".to_string(),
            "hotel_search".to_string(),
            "activity_search".to_string(),
            "itinerary_generation".to_string(),
        ],
        "budget_optimization" => vec![
            "budget_negotiation".to_string(),
            "price_optimization".to_string(),
            "cost_analysis".to_string(),
        ],
        _ => required.to_vec(),
    }
}

/// Preferred agents win; otherwise lowest reported latency.
fn select_best_agent(
    candidates: Vec<AgentRecord>,
    preferred_agents: &[String],
) -> Option<AgentRecord> {
    if candidates.is_empty() {
        return None;
    }

    if let Some(preferred) = candidates
        .iter()
        .find(|c| preferred_agents.contains(&c.id))
    {
        return Some(preferred.clone());
    }

    candidates
        .into_iter()
        .min_by_key(|c| c.response_time_ms.unwrap_or(UNKNOWN_LATENCY_MS))
}

fn success_probability(assigned: usize) -> f64 {
    if assigned == 0 {
        return 0.0;
    }
    let p = AGENT_RELIABILITY.powi(assigned as i32);
    (p * 1000.0).round() / 1000.0
}

/// Fixed base times per capability, summed over the plan.
fn estimated_duration_ms(required: &[String]) -> u64 {
    required
        .iter()
        .map(|capability| match capability.as_str() {
            "flight_search" => 3_000,
            "hotel_search" => 2_500,
            "activity_search" => 2_000,
            "itinerary_generation" => 5_000,
            _ => 1_000,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::AgentStatus;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::BTreeMap as Map;

    fn record(id: &str, capability: &str, latency_ms: u64) -> AgentRecord {
        AgentRecord {
            id: id.to_string(),
            name: id.to_string(),
            version: "1.0.0".to_string(),
            base_url: format!("http://{id}.test"),
            capabilities: [capability.to_string()].into_iter().collect(),
            endpoints: Map::new(),
            last_seen: Utc::now(),
            status: AgentStatus::Active,
            response_time_ms: Some(latency_ms),
        }
    }

    async fn registry_with(records: Vec<AgentRecord>) -> Arc<AgentRegistry> {
        let registry = Arc::new(AgentRegistry::new());
        registry.replace(records).await;
        registry
    }

    #[tokio::test]
    async fn test_lowest_latency_wins_without_preference() {
        let registry = registry_with(vec![
            record("agent-a", "hotel_search", 50),
            record("agent-b", "hotel_search", 200),
        ])
        .await;
        let planner = CoordinationPlanner::new(registry);

        let plan = planner
            .plan(&CoordinateRequest::for_task("comprehensive_trip_planning"))
            .await;

        let hotel = plan.assignment.get("hotel_search").unwrap().as_ref();
        assert_eq!(hotel.unwrap().id, "agent-a");
    }

    #[tokio::test]
    async fn test_preferred_agent_overrides_latency() {
        let registry = registry_with(vec![
            record("agent-a", "hotel_search", 50),
            record("agent-b", "hotel_search", 200),
        ])
        .await;
        let planner = CoordinationPlanner::new(registry);

        let request =
            CoordinateRequest::for_task("comprehensive_trip_planning").preferring("agent-b");
        let plan = planner.plan(&request).await;

        let hotel = plan.assignment.get("hotel_search").unwrap().as_ref();
        assert_eq!(hotel.unwrap().id, "agent-b");
    }

    #[tokio::test]
    async fn test_missing_capability_degrades_not_fails() {
        let registry = registry_with(vec![record("agent-a", "flight_search", 50)]).await;
        let planner = CoordinationPlanner::new(registry);

        let plan = planner
            .plan(&CoordinateRequest::for_task("comprehensive_trip_planning"))
            .await;

        // Exactly one entry per required capability.
        assert_eq!(plan.assignment.len(), plan.required_capabilities.len());
        assert!(plan.assignment.get("hotel_search").unwrap().is_none());
        assert!(plan
            .missing_capabilities
            .contains(&"hotel_search".to_string()));
        // One assigned agent: p = 0.95.
        assert!((plan.success_probability - 0.95).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_empty_registry_zero_probability() {
        let registry = Arc::new(AgentRegistry::new());
        let planner = CoordinationPlanner::new(registry);

        let plan = planner
            .plan(&CoordinateRequest::for_task("comprehensive_trip_planning"))
            .await;
        assert_eq!(plan.success_probability, 0.0);
        assert_eq!(plan.missing_capabilities.len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_task_falls_back_to_generic_capability() {
        let registry = Arc::new(AgentRegistry::new());
        let planner = CoordinationPlanner::new(registry);

        let plan = planner
            .plan(&CoordinateRequest::for_task("interpretive_dance"))
            .await;
        assert_eq!(
            plan.required_capabilities,
            vec!["general_travel_assistance".to_string()]
        );
        assert_eq!(plan.execution_order, plan.required_capabilities);
    }

    #[tokio::test]
    async fn test_duration_estimate_sums_base_times() {
        let registry = Arc::new(AgentRegistry::new());
        let planner = CoordinationPlanner::new(registry);

        let plan = planner
            .plan(&CoordinateRequest::for_task("comprehensive_trip_planning"))
            .await;
        // 3000 + 2500 + 2000 + 5000
        assert_eq!(plan.estimated_duration_ms, 12_500);
    }

    struct RejectAll;

    #[async_trait]
    impl AvailabilityProbe for RejectAll {
        async fn is_available(&self, _base_url: &str) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_liveness_check_filters_candidates() {
        let registry = registry_with(vec![record("agent-a", "flight_search", 50)]).await;
        let planner = CoordinationPlanner::new(registry).with_liveness(Arc::new(RejectAll));

        let plan = planner
            .plan(&CoordinateRequest::for_task("comprehensive_trip_planning"))
            .await;
        assert!(plan.assignment.get("flight_search").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_probability_bounds() {
        let registry = registry_with(vec![
            record("a", "flight_search", 10),
            record("b", "hotel_search", 10),
            record("c", "activity_search", 10),
            record("d", "itinerary_generation", 10),
        ])
        .await;
        let planner = CoordinationPlanner::new(registry);

        let plan = planner
            .plan(&CoordinateRequest::for_task("comprehensive_trip_planning"))
            .await;
        assert!(plan.success_probability > 0.0 && plan.success_probability <= 1.0);
        // 0.95^4 rounded to three decimals.
        assert!((plan.success_probability - 0.815).abs() < 1e-9);
    }
}
