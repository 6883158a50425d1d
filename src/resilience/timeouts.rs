//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap each request attempt with a deadline
//! - Cancel the in-flight call cleanly when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other network errors

use std::future::Future;
use std::time::Duration;

use crate::client::error::{RequestError, RequestResult};

/// Run `fut` with a deadline, mapping expiry to [`RequestError::Timeout`].
pub async fn with_timeout<T, F>(duration: Duration, fut: F) -> RequestResult<T>
where
    F: Future<Output = RequestResult<T>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(RequestError::Timeout(duration.as_secs())),
    }
}
