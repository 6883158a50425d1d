//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, retry cap within 1-10)
//! - Check the base URL is an absolute http(s) URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;
use crate::resilience::retries::{MAX_RETRIES_CEILING, MAX_RETRIES_FLOOR};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("api.base_url '{0}' is not a valid http(s) URL")]
    InvalidBaseUrl(String),

    #[error("api.request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("retry.max_retries must be between 1 and 10, got {0}")]
    MaxRetriesOutOfRange(u32),

    #[error("retry.network_base_delay_ms ({base}) exceeds retry.network_max_delay_ms ({max})")]
    BackoffInverted { base: u64, max: u64 },

    #[error("session.{0} must be greater than zero")]
    ZeroSessionAge(&'static str),
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.api.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::InvalidBaseUrl(config.api.base_url.clone())),
    }

    if config.api.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let max_retries = config.retry.max_retries;
    if !(MAX_RETRIES_FLOOR..=MAX_RETRIES_CEILING).contains(&max_retries) {
        errors.push(ValidationError::MaxRetriesOutOfRange(max_retries));
    }

    if config.retry.network_base_delay_ms > config.retry.network_max_delay_ms {
        errors.push(ValidationError::BackoffInverted {
            base: config.retry.network_base_delay_ms,
            max: config.retry.network_max_delay_ms,
        });
    }

    if config.session.demo_max_age_secs == 0 {
        errors.push(ValidationError::ZeroSessionAge("demo_max_age_secs"));
    }
    if config.session.max_age_secs == 0 {
        errors.push(ValidationError::ZeroSessionAge("max_age_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
