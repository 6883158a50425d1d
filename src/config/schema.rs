//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the request client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// API endpoint settings.
    pub api: ApiConfig,

    /// Retry policy and delays.
    pub retry: RetryConfig,

    /// Session persistence and lifetimes.
    pub session: SessionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// API endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint is appended to.
    pub base_url: String,

    /// Public anon key sent as the bearer token.
    pub anon_key: String,

    /// Per-attempt timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321/functions/v1".to_string(),
            anon_key: String::new(),
            request_timeout_secs: 15,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable automatic retries.
    pub auto_retry_enabled: bool,

    /// Total attempts per request (1-10).
    pub max_retries: u32,

    /// Pause after a successful session refresh, in milliseconds.
    pub auth_delay_ms: u64,

    /// First network backoff delay in milliseconds; doubles per attempt.
    pub network_base_delay_ms: u64,

    /// Upper bound for network backoff in milliseconds.
    pub network_max_delay_ms: u64,

    /// Fixed delay after a 5xx response in milliseconds.
    pub server_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            auto_retry_enabled: true,
            max_retries: 3,
            auth_delay_ms: 1000,
            network_base_delay_ms: 1000,
            network_max_delay_ms: 5000,
            server_delay_ms: 2000,
        }
    }
}

/// Session store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// File the session is persisted to. `None` keeps it in memory only.
    pub store_path: Option<String>,

    /// Lifetime of a demo session in seconds (24h).
    pub demo_max_age_secs: u64,

    /// Lifetime of a regular session in seconds (7d).
    pub max_age_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_path: Some("maak-session.json".to_string()),
            demo_max_age_secs: 24 * 60 * 60,
            max_age_secs: 7 * 24 * 60 * 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
