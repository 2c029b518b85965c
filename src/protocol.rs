//! Typed request/response payloads for the hub's external surfaces.
//!
//! The HTTP layer that routes these lives outside this crate; the types pin
//! down the wire contract, required vs optional fields included, instead of
//! passing loose JSON maps around.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::registry::AgentRecord;

/// Row returned by the find-by-capability query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityAgent {
    pub agent_id: String,
    pub name: String,
    pub base_url: String,
    pub capabilities: BTreeSet<String>,
    pub available: bool,
    pub last_seen: DateTime<Utc>,
    pub response_time_ms: Option<u64>,
}

impl CapabilityAgent {
    pub fn from_record(record: &AgentRecord, available: bool) -> Self {
        Self {
            agent_id: record.id.clone(),
            name: record.name.clone(),
            base_url: record.base_url.clone(),
            capabilities: record.capabilities.clone(),
            available,
            last_seen: record.last_seen,
            response_time_ms: record.response_time_ms,
        }
    }
}

/// Coordinate request: which task to plan for, with optional agent
/// preferences and free-form requirements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinateRequest {
    pub task_type: String,
    #[serde(default)]
    pub requirements: serde_json::Value,
    #[serde(default)]
    pub preferred_agents: Vec<String>,
}

impl CoordinateRequest {
    pub fn for_task(task_type: impl Into<String>) -> Self {
        Self {
            task_type: task_type.into(),
            requirements: serde_json::Value::Null,
            preferred_agents: Vec::new(),
        }
    }

    pub fn preferring(mut self, agent_id: impl Into<String>) -> Self {
        self.preferred_agents.push(agent_id.into());
        self
    }
}
