//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! client, retries, session store produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters and histograms via the metrics facade)
//! ```
//!
//! # Design Decisions
//! - Structured fields (endpoint, attempt, class) on every retry event
//! - Metrics go through the facade; the embedding application installs a recorder

pub mod logging;
pub mod metrics;
