use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

use std::time::Duration;

use crate::negotiation::NegotiationPolicy;
use crate::providers::RetryPolicy;
use crate::search::budget::BudgetAllocation;
use crate::search::orchestrator::OrchestratorConfig;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub negotiation: NegotiationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// Agent endpoints to probe each discovery cycle
    #[serde(default = "default_known_endpoints")]
    pub known_endpoints: Vec<String>,
    /// Per-probe timeout in seconds
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    /// Timeout for the quick availability check (GET /) in seconds
    #[serde(default = "default_availability_timeout_secs")]
    pub availability_timeout_secs: u64,
    /// Global timeout for one discovery cycle in seconds
    #[serde(default = "default_cycle_timeout_secs")]
    pub cycle_timeout_secs: u64,
    /// Interval between discovery cycles in seconds
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
    /// Capabilities the ecosystem must cover to be considered complete
    #[serde(default = "default_essential_capabilities")]
    pub essential_capabilities: Vec<String>,
}

fn default_known_endpoints() -> Vec<String> {
    vec![
        "http://localhost:8001".to_string(), // flight booking agent
        "http://localhost:8002".to_string(), // hotel booking agent
        "http://localhost:8003".to_string(), // activity planning agent
        "http://localhost:8004".to_string(), // AI itinerary agent
        "http://localhost:8000".to_string(), // orchestrator
    ]
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_availability_timeout_secs() -> u64 {
    3
}

fn default_cycle_timeout_secs() -> u64 {
    15
}

fn default_scan_interval_secs() -> u64 {
    60
}

fn default_essential_capabilities() -> Vec<String> {
    vec![
        "flight_search".to_string(),
        "hotel_search".to_string(),
        "activity_search".to_string(),
        "itinerary_generation".to_string(),
    ]
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            known_endpoints: default_known_endpoints(),
            probe_timeout_secs: default_probe_timeout_secs(),
            availability_timeout_secs: default_availability_timeout_secs(),
            cycle_timeout_secs: default_cycle_timeout_secs(),
            scan_interval_secs: default_scan_interval_secs(),
            essential_capabilities: default_essential_capabilities(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Attempts per provider before advancing down the fallback chain
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay for exponential backoff between retries (doubles each attempt)
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
    /// Cap on a single backoff delay
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Per-provider request timeout in milliseconds
    #[serde(default = "default_provider_timeout_ms")]
    pub provider_timeout_ms: u64,
    /// Global deadline for one plan-trip request in milliseconds
    #[serde(default = "default_global_deadline_ms")]
    pub global_deadline_ms: u64,
    /// Fractional budget split across categories
    #[serde(default)]
    pub allocation: BudgetAllocation,
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    8_000
}

fn default_provider_timeout_ms() -> u64 {
    3_000
}

fn default_global_deadline_ms() -> u64 {
    10_000
}

impl SearchConfig {
    /// Retry budget applied to every provider chain link.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_backoff_ms: self.base_backoff_ms,
            max_backoff_ms: self.max_backoff_ms,
        }
    }

    /// Per-provider request timeout.
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            allocation: self.allocation,
            global_deadline: Duration::from_millis(self.global_deadline_ms),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_backoff_ms: default_base_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            provider_timeout_ms: default_provider_timeout_ms(),
            global_deadline_ms: default_global_deadline_ms(),
            allocation: BudgetAllocation::default(),
        }
    }
}

/// Undocumented business constants from the booking agents, kept overridable.
#[derive(Debug, Clone, Deserialize)]
pub struct NegotiationConfig {
    /// Maximum hotel discount as a fraction of the sticker rate (0.15 = 15%)
    #[serde(default = "default_hotel_max_discount")]
    pub hotel_max_discount: Decimal,
    /// Minutes a hotel counter-offer stays valid
    #[serde(default = "default_hotel_counter_expiry_minutes")]
    pub hotel_counter_expiry_minutes: u32,
    /// Maximum flight discount as a fraction of the current fare (0.10 = 10%)
    #[serde(default = "default_flight_max_discount")]
    pub flight_max_discount: Decimal,
    /// Minutes a flight counter-offer stays valid
    #[serde(default = "default_flight_counter_expiry_minutes")]
    pub flight_counter_expiry_minutes: u32,
}

fn default_hotel_max_discount() -> Decimal {
    NegotiationPolicy::hotel().max_discount
}

fn default_hotel_counter_expiry_minutes() -> u32 {
    NegotiationPolicy::hotel().counter_expiry_minutes
}

fn default_flight_max_discount() -> Decimal {
    NegotiationPolicy::flight().max_discount
}

fn default_flight_counter_expiry_minutes() -> u32 {
    NegotiationPolicy::flight().counter_expiry_minutes
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            hotel_max_discount: default_hotel_max_discount(),
            hotel_counter_expiry_minutes: default_hotel_counter_expiry_minutes(),
            flight_max_discount: default_flight_max_discount(),
            flight_counter_expiry_minutes: default_flight_counter_expiry_minutes(),
        }
    }
}

impl NegotiationConfig {
    pub fn hotel_policy(&self) -> NegotiationPolicy {
        NegotiationPolicy {
            max_discount: self.hotel_max_discount,
            counter_expiry_minutes: self.hotel_counter_expiry_minutes,
        }
    }

    pub fn flight_policy(&self) -> NegotiationPolicy {
        NegotiationPolicy {
            max_discount: self.flight_max_discount,
            counter_expiry_minutes: self.flight_counter_expiry_minutes,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("WAYFARER_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (WAYFARER_SEARCH__MAX_RETRIES, etc.)
            .add_source(
                Environment::with_prefix("WAYFARER")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.discovery.known_endpoints.is_empty() {
            errors.push("discovery.known_endpoints must not be empty".to_string());
        }

        if self.discovery.probe_timeout_secs == 0 {
            errors.push("discovery.probe_timeout_secs must be positive".to_string());
        }

        if self.search.max_retries == 0 {
            errors.push("search.max_retries must be at least 1".to_string());
        }

        if let Err(e) = self.search.allocation.validate() {
            errors.push(e);
        }

        for (name, discount) in [
            ("hotel_max_discount", self.negotiation.hotel_max_discount),
            ("flight_max_discount", self.negotiation.flight_max_discount),
        ] {
            if discount <= Decimal::ZERO || discount >= Decimal::ONE {
                errors.push(format!("negotiation.{name} must be between 0 and 1"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig {
            discovery: DiscoveryConfig::default(),
            search: SearchConfig::default(),
            negotiation: NegotiationConfig::default(),
            logging: LoggingConfig::default(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_discount() {
        let mut config = AppConfig {
            discovery: DiscoveryConfig::default(),
            search: SearchConfig::default(),
            negotiation: NegotiationConfig::default(),
            logging: LoggingConfig::default(),
        };
        config.negotiation.hotel_max_discount = dec!(1.5);

        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("hotel_max_discount")));
    }

    #[test]
    fn test_validate_rejects_empty_endpoints() {
        let mut config = AppConfig {
            discovery: DiscoveryConfig::default(),
            search: SearchConfig::default(),
            negotiation: NegotiationConfig::default(),
            logging: LoggingConfig::default(),
        };
        config.discovery.known_endpoints.clear();

        let errors = config.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("known_endpoints")));
    }

    #[test]
    fn test_search_config_maps_to_retry_and_deadline() {
        let search = SearchConfig::default();
        let retry = search.retry_policy();
        assert_eq!(retry.max_retries, 3);
        assert_eq!(retry.base_backoff_ms, 500);

        let orchestrator = search.orchestrator_config();
        assert_eq!(orchestrator.global_deadline, Duration::from_secs(10));
        assert!(orchestrator.allocation.validate().is_ok());
    }

    #[test]
    fn test_negotiation_policies_from_config() {
        let config = NegotiationConfig::default();
        assert_eq!(config.hotel_policy().max_discount, dec!(0.15));
        assert_eq!(config.flight_policy().max_discount, dec!(0.10));
        assert_eq!(config.hotel_policy().counter_expiry_minutes, 20);
        assert_eq!(config.flight_policy().counter_expiry_minutes, 15);
    }
}
