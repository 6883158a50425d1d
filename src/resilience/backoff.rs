//! Exponential backoff for network failures.

use std::time::Duration;

/// Calculate the delay before retrying a network failure.
///
/// `attempt` is the zero-based index of the attempt that just failed, so the
/// first retry waits `base_ms`, the second `2 * base_ms`, and so on until
/// `max_ms` caps the delay. No jitter is applied.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let exponential_base = 2u64.saturating_pow(attempt);
    let delay_ms = base_ms.saturating_mul(exponential_base);

    Duration::from_millis(delay_ms.min(max_ms))
}
