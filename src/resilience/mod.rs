//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request attempt:
//!     → timeouts.rs (15s deadline per attempt)
//!     → On failure: retries.rs (classify, decide, wait)
//!         → backoff.rs (exponential delay for network failures)
//! ```
//!
//! # Design Decisions
//! - Every outbound call has a deadline
//! - Classification decides the delay; fatal errors are never retried
//! - The retry policy is runtime-mutable and read on every decision

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{Classify, ErrorClass, RetryPolicy, RetryTimings};
