//! Metrics collection.
//!
//! # Metrics
//! - `client_requests_total` (counter): calls by endpoint kind and outcome
//! - `client_request_duration_seconds` (histogram): end-to-end call latency, retries included
//! - `client_retries_total` (counter): retries by error class
//! - `client_session_recoveries_total` (counter): refresh/emergency recoveries by outcome
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels are static strings to keep cardinality bounded

use std::time::Instant;

pub fn record_request(endpoint_kind: &'static str, outcome: &'static str, start: Instant) {
    ::metrics::counter!(
        "client_requests_total",
        "endpoint_kind" => endpoint_kind,
        "outcome" => outcome
    )
    .increment(1);
    ::metrics::histogram!(
        "client_request_duration_seconds",
        "endpoint_kind" => endpoint_kind
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_retry(class: &'static str) {
    ::metrics::counter!("client_retries_total", "class" => class).increment(1);
}

pub fn record_session_recovery(kind: &'static str, outcome: &'static str) {
    ::metrics::counter!(
        "client_session_recoveries_total",
        "kind" => kind,
        "outcome" => outcome
    )
    .increment(1);
}
