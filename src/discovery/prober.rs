//! Discovery prober: builds each registry generation.
//!
//! One cycle probes every known endpoint concurrently under a per-probe
//! timeout and a global cycle timeout, then publishes the surviving records
//! with a single atomic registry replace. A failed or slow probe only costs
//! that endpoint its slot in the new generation; previously known agents
//! fall back to `Inactive` via the registry's carry-forward.

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{interval, timeout};
use tracing::{debug, info, warn};

use super::card::AgentCard;
use crate::config::DiscoveryConfig;
use crate::error::{Result, WayfarerError};
use crate::protocol::CapabilityAgent;
use crate::registry::{AgentRecord, AgentRegistry};

/// Ecosystem health derived from one discovery cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    Healthy,
    Degraded,
    Critical,
}

impl HealthLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            HealthLevel::Healthy
        } else if score >= 60.0 {
            HealthLevel::Degraded
        } else {
            HealthLevel::Critical
        }
    }
}

impl std::fmt::Display for HealthLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthLevel::Healthy => write!(f, "healthy"),
            HealthLevel::Degraded => write!(f, "degraded"),
            HealthLevel::Critical => write!(f, "critical"),
        }
    }
}

/// Health report for the agent ecosystem after a discovery cycle.
#[derive(Debug, Clone, Serialize)]
pub struct EcosystemHealth {
    pub discovered: usize,
    pub expected: usize,
    /// discovered/expected × 100
    pub score: f64,
    pub status: HealthLevel,
    pub essential_capabilities_covered: usize,
    pub essential_capabilities_total: usize,
    pub redundancy_level: &'static str,
}

impl EcosystemHealth {
    pub fn from_counts(
        discovered: usize,
        expected: usize,
        essential_covered: usize,
        essential_total: usize,
        redundancy_level: &'static str,
    ) -> Self {
        let score = if expected > 0 {
            (discovered as f64 / expected as f64) * 100.0
        } else {
            0.0
        };
        // One decimal, matching the reported percentage format.
        let score = (score * 10.0).round() / 10.0;

        Self {
            discovered,
            expected,
            score,
            status: HealthLevel::from_score(score),
            essential_capabilities_covered: essential_covered,
            essential_capabilities_total: essential_total,
            redundancy_level,
        }
    }
}

/// Secondary liveness check used by the planner and capability queries.
/// Trait-shaped so planning stays testable without a network.
#[async_trait]
pub trait AvailabilityProbe: Send + Sync {
    async fn is_available(&self, base_url: &str) -> bool;
}

pub struct DiscoveryProber {
    registry: Arc<AgentRegistry>,
    http: Client,
    cfg: DiscoveryConfig,
}

impl DiscoveryProber {
    pub fn new(registry: Arc<AgentRegistry>, cfg: DiscoveryConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent("wayfarer-discovery/0.1")
            .build()
            .map_err(|e| WayfarerError::Internal(format!("failed to build probe HTTP client: {e}")))?;

        Ok(Self {
            registry,
            http,
            cfg,
        })
    }

    /// Run discovery cycles forever (call from a spawned task).
    pub async fn run_forever(&self) {
        info!(
            "DiscoveryProber: starting (interval={}s, {} known endpoints)",
            self.cfg.scan_interval_secs,
            self.cfg.known_endpoints.len()
        );

        let mut ticker = interval(Duration::from_secs(self.cfg.scan_interval_secs));
        // The first tick fires immediately; skip it so the caller's initial
        // cycle is not followed by a back-to-back second one.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let health = self.run_once().await;
            info!(
                "DiscoveryProber: cycle complete, {}/{} agents, score {:.1} ({})",
                health.discovered, health.expected, health.score, health.status
            );
        }
    }

    /// Execute a single discovery cycle and publish the new generation.
    pub async fn run_once(&self) -> EcosystemHealth {
        let cycle_deadline = Duration::from_secs(self.cfg.cycle_timeout_secs);
        let expected = self.cfg.known_endpoints.len();

        // Each probe races the cycle deadline on its own: a straggler
        // forfeits only its slot, probes that already answered still count.
        let probes = self.cfg.known_endpoints.iter().map(|endpoint| async move {
            match timeout(cycle_deadline, self.probe_endpoint(endpoint)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(WayfarerError::ProbeTimeout {
                    endpoint: endpoint.to_string(),
                    timeout_ms: cycle_deadline.as_millis() as u64,
                }),
            }
        });
        let outcomes = join_all(probes).await;

        let mut records: Vec<AgentRecord> = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(record) => {
                    debug!(
                        "DiscoveryProber: discovered {} ({}) at {}",
                        record.name, record.id, record.base_url
                    );
                    records.push(record);
                }
                Err(e) => warn!("DiscoveryProber: {e}"),
            }
        }

        let discovered = records.len();
        self.registry.replace(records).await;

        let snapshot = self.registry.snapshot().await;
        let active_caps = snapshot.active_capabilities();
        let essential_covered = self
            .cfg
            .essential_capabilities
            .iter()
            .filter(|c| active_caps.contains(*c))
            .count();

        EcosystemHealth::from_counts(
            discovered,
            expected,
            essential_covered,
            self.cfg.essential_capabilities.len(),
            snapshot.redundancy_level(),
        )
    }

    /// Probe a single endpoint for its agent card.
    pub async fn probe_endpoint(&self, endpoint: &str) -> Result<AgentRecord> {
        let base = endpoint.trim_end_matches('/');
        let url = format!("{base}/.well-known/agent");
        let probe_timeout = Duration::from_secs(self.cfg.probe_timeout_secs);
        let started = Instant::now();

        let response = timeout(probe_timeout, self.http.get(&url).send())
            .await
            .map_err(|_| WayfarerError::ProbeTimeout {
                endpoint: endpoint.to_string(),
                timeout_ms: probe_timeout.as_millis() as u64,
            })?
            .map_err(|e| WayfarerError::Probe {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(WayfarerError::Probe {
                endpoint: endpoint.to_string(),
                reason: format!("unexpected status {}", response.status()),
            });
        }

        let card: AgentCard = response.json().await.map_err(|e| WayfarerError::Probe {
            endpoint: endpoint.to_string(),
            reason: format!("malformed agent card: {e}"),
        })?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        Ok(card.into_record(base, elapsed_ms))
    }

    /// Find agents offering a capability, with a live availability check per
    /// candidate (the find-by-capability query surface).
    pub async fn find_agents_by_capability(&self, capability: &str) -> Vec<CapabilityAgent> {
        let snapshot = self.registry.snapshot().await;
        let candidates: Vec<AgentRecord> = snapshot
            .find_by_capability_all(capability)
            .into_iter()
            .cloned()
            .collect();

        let checks = candidates.iter().map(|r| self.is_available(&r.base_url));
        let availability = join_all(checks).await;

        candidates
            .into_iter()
            .zip(availability)
            .map(|(record, available)| CapabilityAgent::from_record(&record, available))
            .collect()
    }
}

#[async_trait]
impl AvailabilityProbe for DiscoveryProber {
    /// Quick liveness check: GET on the agent root with a short timeout.
    async fn is_available(&self, base_url: &str) -> bool {
        let url = format!("{}/", base_url.trim_end_matches('/'));
        let check_timeout = Duration::from_secs(self.cfg.availability_timeout_secs);

        match timeout(check_timeout, self.http.get(&url).send()).await {
            Ok(Ok(response)) => response.status().is_success(),
            _ => false,
        }
    }
}
