//! Agent registry with copy-on-write snapshots.
//!
//! The discovery prober is the single writer: each cycle it builds a full
//! set of `AgentRecord`s and publishes them with one atomic swap. Readers
//! clone the current `Arc<RegistrySnapshot>` and never observe a registry
//! whose capability index disagrees with its records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Liveness of an agent as of the latest discovery generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Inactive,
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentStatus::Active => write!(f, "active"),
            AgentStatus::Inactive => write!(f, "inactive"),
        }
    }
}

/// Everything the hub knows about one discovered agent.
///
/// Records are created wholesale by the prober and never partially mutated;
/// a failed probe produces a new `Inactive` record carrying the last-known
/// metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: String,
    pub name: String,
    pub version: String,
    pub base_url: String,
    pub capabilities: BTreeSet<String>,
    pub endpoints: BTreeMap<String, String>,
    pub last_seen: DateTime<Utc>,
    pub status: AgentStatus,
    pub response_time_ms: Option<u64>,
}

impl AgentRecord {
    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }

    /// Derive the inactive carry-forward of this record for a new generation.
    pub fn as_inactive(&self) -> Self {
        let mut record = self.clone();
        record.status = AgentStatus::Inactive;
        record.response_time_ms = None;
        record
    }
}

/// Immutable registry generation: records plus the capability index derived
/// from them in the same build step.
#[derive(Debug, Default)]
pub struct RegistrySnapshot {
    records: BTreeMap<String, AgentRecord>,
    capability_index: BTreeMap<String, BTreeSet<String>>,
}

impl RegistrySnapshot {
    /// Build a snapshot from a full record set, indexing capabilities as we go.
    pub fn build(records: Vec<AgentRecord>) -> Self {
        let mut map = BTreeMap::new();
        let mut index: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for record in records {
            for capability in &record.capabilities {
                index
                    .entry(capability.clone())
                    .or_default()
                    .insert(record.id.clone());
            }
            map.insert(record.id.clone(), record);
        }

        Self {
            records: map,
            capability_index: index,
        }
    }

    pub fn get(&self, agent_id: &str) -> Option<&AgentRecord> {
        self.records.get(agent_id)
    }

    pub fn records(&self) -> impl Iterator<Item = &AgentRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.records.values().filter(|r| r.is_active()).count()
    }

    /// Capability → agent ids, including inactive agents.
    pub fn capability_index(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.capability_index
    }

    /// Active agents offering a capability.
    pub fn find_by_capability(&self, capability: &str) -> Vec<&AgentRecord> {
        self.find_by_capability_filtered(capability, true)
    }

    /// All agents offering a capability, regardless of status.
    pub fn find_by_capability_all(&self, capability: &str) -> Vec<&AgentRecord> {
        self.find_by_capability_filtered(capability, false)
    }

    fn find_by_capability_filtered(&self, capability: &str, active_only: bool) -> Vec<&AgentRecord> {
        let Some(ids) = self.capability_index.get(capability) else {
            return Vec::new();
        };

        ids.iter()
            .filter_map(|id| self.records.get(id))
            .filter(|r| !active_only || r.is_active())
            .collect()
    }

    /// Distinct capabilities offered by at least one active agent.
    pub fn active_capabilities(&self) -> BTreeSet<String> {
        self.records
            .values()
            .filter(|r| r.is_active())
            .flat_map(|r| r.capabilities.iter().cloned())
            .collect()
    }

    /// Share of capabilities served by more than one agent: high >= 0.7,
    /// medium >= 0.4, else low.
    pub fn redundancy_level(&self) -> &'static str {
        let total = self.capability_index.len();
        if total == 0 {
            return "none";
        }

        let redundant = self
            .capability_index
            .values()
            .filter(|ids| ids.len() > 1)
            .count();
        let ratio = redundant as f64 / total as f64;

        if ratio >= 0.7 {
            "high"
        } else if ratio >= 0.4 {
            "medium"
        } else {
            "low"
        }
    }
}

/// Shared registry handle. Single writer (the prober), any number of readers.
#[derive(Default)]
pub struct AgentRegistry {
    inner: RwLock<Arc<RegistrySnapshot>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current consistent registry + index pair. Callers hold the `Arc`, not
    /// the lock, so they can read across awaits without blocking the writer.
    pub async fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.inner.read().await.clone()
    }

    /// Atomically replace the registry with a new generation.
    ///
    /// Agents known to the previous generation but absent from `records` are
    /// carried forward as `Inactive` so callers can still see last-known
    /// metadata; they are never silently dropped.
    pub async fn replace(&self, records: Vec<AgentRecord>) {
        let previous = self.snapshot().await;

        let mut merged: BTreeMap<String, AgentRecord> = records
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect();

        for (id, old) in &previous.records {
            merged
                .entry(id.clone())
                .or_insert_with(|| old.as_inactive());
        }

        let next = Arc::new(RegistrySnapshot::build(merged.into_values().collect()));
        debug!(
            "registry replaced: {} records ({} active), {} capabilities",
            next.len(),
            next.active_count(),
            next.capability_index.len()
        );

        *self.inner.write().await = next;
    }
}
