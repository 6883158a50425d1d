//! Retry logic.
//!
//! # Responsibilities
//! - Classify failures as auth, network, server or fatal
//! - Execute retries with the delay each class calls for
//! - Enforce the attempt cap from the runtime retry policy
//!
//! # Design Decisions
//! - Fatal errors are returned after the first attempt
//! - Auth failures retry only after the session provider recovers a session
//! - Exhaustion returns the last real error, never a synthetic one
//! - Bounded loop, no recursion

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use crate::config::RetryConfig;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;

/// Lowest accepted attempt cap.
pub const MAX_RETRIES_FLOOR: u32 = 1;

/// Highest accepted attempt cap.
pub const MAX_RETRIES_CEILING: u32 = 10;

const AUTH_PATTERNS: &[&str] = &["401", "unauthorized", "session", "authenticated"];
const NETWORK_PATTERNS: &[&str] = &["fetch", "network", "timeout"];
const SERVER_PATTERNS: &[&str] = &["500", "502", "503"];

/// Recovery class of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Session missing or expired; recoverable through a session refresh.
    Auth,
    /// Connectivity problem or timeout; recoverable with backoff.
    Network,
    /// 5xx from the server; recoverable after a fixed delay.
    Server,
    /// Anything else. Never retried.
    Fatal,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Auth => "auth",
            ErrorClass::Network => "network",
            ErrorClass::Server => "server",
            ErrorClass::Fatal => "fatal",
        }
    }

    /// Classify free-form error text by case-insensitive substring match.
    ///
    /// Auth patterns win over network patterns, which win over server patterns.
    pub fn from_message(message: &str) -> Self {
        let lowered = message.to_lowercase();
        let matches_any = |patterns: &[&str]| patterns.iter().any(|p| lowered.contains(p));

        if matches_any(AUTH_PATTERNS) {
            ErrorClass::Auth
        } else if matches_any(NETWORK_PATTERNS) {
            ErrorClass::Network
        } else if matches_any(SERVER_PATTERNS) {
            ErrorClass::Server
        } else {
            ErrorClass::Fatal
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can report their recovery class.
pub trait Classify {
    fn class(&self) -> ErrorClass;
}

/// Runtime-mutable retry switches.
///
/// Both fields are atomics so the policy can be flipped while requests are in
/// flight; every retry decision reads the current value.
#[derive(Debug)]
pub struct RetryPolicy {
    auto_retry_enabled: AtomicBool,
    max_retries: AtomicU32,
}

impl RetryPolicy {
    pub fn new(auto_retry_enabled: bool, max_retries: u32) -> Self {
        Self {
            auto_retry_enabled: AtomicBool::new(auto_retry_enabled),
            max_retries: AtomicU32::new(clamp_max_retries(i64::from(max_retries))),
        }
    }

    pub fn auto_retry_enabled(&self) -> bool {
        self.auto_retry_enabled.load(Ordering::Relaxed)
    }

    pub fn set_auto_retry(&self, enabled: bool) {
        self.auto_retry_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries.load(Ordering::Relaxed)
    }

    /// Store `value` clamped into `[1, 10]` and return what was stored.
    pub fn set_max_retries(&self, value: i64) -> u32 {
        let clamped = clamp_max_retries(value);
        self.max_retries.store(clamped, Ordering::Relaxed);
        clamped
    }

    /// Whether an attempt with zero-based index `attempt` may be followed by another.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        self.auto_retry_enabled() && attempt.saturating_add(1) < self.max_retries()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        let config = RetryConfig::default();
        Self::new(config.auto_retry_enabled, config.max_retries)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.auto_retry_enabled, config.max_retries)
    }
}

/// Clamp a requested attempt cap into the accepted range.
pub fn clamp_max_retries(value: i64) -> u32 {
    value.clamp(i64::from(MAX_RETRIES_FLOOR), i64::from(MAX_RETRIES_CEILING)) as u32
}

/// Delays applied between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryTimings {
    pub auth_delay: Duration,
    pub network_base_delay: Duration,
    pub network_max_delay: Duration,
    pub server_delay: Duration,
}

impl RetryTimings {
    /// Delay before the attempt following a failed attempt `attempt` of class `class`.
    ///
    /// Returns `None` for fatal errors.
    pub fn delay_for(&self, class: ErrorClass, attempt: u32) -> Option<Duration> {
        match class {
            ErrorClass::Auth => Some(self.auth_delay),
            ErrorClass::Network => Some(calculate_backoff(
                attempt,
                self.network_base_delay.as_millis() as u64,
                self.network_max_delay.as_millis() as u64,
            )),
            ErrorClass::Server => Some(self.server_delay),
            ErrorClass::Fatal => None,
        }
    }
}

impl Default for RetryTimings {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryTimings {
    fn from(config: &RetryConfig) -> Self {
        Self {
            auth_delay: Duration::from_millis(config.auth_delay_ms),
            network_base_delay: Duration::from_millis(config.network_base_delay_ms),
            network_max_delay: Duration::from_millis(config.network_max_delay_ms),
            server_delay: Duration::from_millis(config.server_delay_ms),
        }
    }
}

/// Run `operation` until it succeeds, fails fatally, or the policy runs out.
///
/// `operation` receives the zero-based attempt index. `recover_session` is
/// awaited before an auth retry; returning `false` ends the loop with the
/// original error.
pub async fn execute<T, E, Op, Fut, Rec, RecFut>(
    policy: &RetryPolicy,
    timings: &RetryTimings,
    endpoint: &str,
    mut operation: Op,
    mut recover_session: Rec,
) -> Result<T, E>
where
    E: Classify + fmt::Display,
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    Rec: FnMut() -> RecFut,
    RecFut: Future<Output = bool>,
{
    let mut attempt: u32 = 0;

    loop {
        let error = match operation(attempt).await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(endpoint, attempt, "Request succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        let class = error.class();
        let delay = match timings.delay_for(class, attempt) {
            Some(delay) => delay,
            None => {
                tracing::warn!(endpoint, attempt, error = %error, "Non-recoverable request error");
                return Err(error);
            }
        };

        if !policy.allows_retry_after(attempt) {
            tracing::warn!(
                endpoint,
                attempt,
                class = %class,
                auto_retry = policy.auto_retry_enabled(),
                max_retries = policy.max_retries(),
                error = %error,
                "Giving up on request"
            );
            return Err(error);
        }

        if class == ErrorClass::Auth && !recover_session().await {
            tracing::warn!(endpoint, attempt, error = %error, "Session refresh failed, not retrying");
            return Err(error);
        }

        tracing::info!(
            endpoint,
            attempt,
            class = %class,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Retrying request"
        );
        metrics::record_retry(class.as_str());

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
