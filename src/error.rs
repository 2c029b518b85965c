use thiserror::Error;

/// Main error type for the coordination core
#[derive(Error, Debug)]
pub enum WayfarerError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Discovery errors
    #[error("Probe timed out after {timeout_ms}ms: {endpoint}")]
    ProbeTimeout { endpoint: String, timeout_ms: u64 },

    #[error("Probe failed for {endpoint}: {reason}")]
    Probe { endpoint: String, reason: String },

    // Provider search errors
    #[error("Provider search failed: {provider} - {reason}")]
    ProviderSearch { provider: String, reason: String },

    #[error("Provider returned no offers: {provider}")]
    ProviderEmptyResult { provider: String },

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for WayfarerError
pub type Result<T> = std::result::Result<T, WayfarerError>;
