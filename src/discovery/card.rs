//! Agent discovery card: the JSON body served at `/.well-known/agent`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::registry::{AgentRecord, AgentStatus};

/// The card every agent serves about itself and the prober consumes from
/// every known endpoint. Unknown extra fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCard {
    #[serde(default = "default_agent_id")]
    pub agent_id: String,
    #[serde(default = "default_agent_name")]
    pub name: String,
    #[serde(default = "default_agent_version")]
    pub version: String,
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}

fn default_agent_id() -> String {
    "unknown".to_string()
}

fn default_agent_name() -> String {
    "Unknown Agent".to_string()
}

fn default_agent_version() -> String {
    "1.0.0".to_string()
}

impl AgentCard {
    /// Build the registry record for a freshly probed agent.
    pub fn into_record(self, base_url: &str, response_time_ms: u64) -> AgentRecord {
        AgentRecord {
            id: self.agent_id,
            name: self.name,
            version: self.version,
            base_url: base_url.trim_end_matches('/').to_string(),
            capabilities: self.capabilities,
            endpoints: self.endpoints,
            last_seen: Utc::now(),
            status: AgentStatus::Active,
            response_time_ms: Some(response_time_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_parses_with_missing_fields() {
        let card: AgentCard = serde_json::from_str(r#"{"capabilities": ["hotel_search"]}"#).unwrap();
        assert_eq!(card.agent_id, "unknown");
        assert!(card.capabilities.contains("hotel_search"));
    }

    #[test]
    fn test_into_record_marks_active_with_latency() {
        let card: AgentCard = serde_json::from_str(
            r#"{
                "agent_id": "hotel-booking-agent",
                "name": "HotelBookingAgent",
                "version": "1.0.0",
                "capabilities": ["hotel_search", "budget_negotiation"],
                "endpoints": {"search_hotels": "/api/search-hotels"}
            }"#,
        )
        .unwrap();

        let record = card.into_record("http://localhost:8002/", 42);
        assert_eq!(record.id, "hotel-booking-agent");
        assert_eq!(record.base_url, "http://localhost:8002");
        assert_eq!(record.status, AgentStatus::Active);
        assert_eq!(record.response_time_ms, Some(42));
    }
}
