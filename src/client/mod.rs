//! Request client subsystem.
//!
//! # Data Flow
//! ```text
//! caller → ResilientClient::request(endpoint, options)
//!     → endpoint.rs (public or protected?)
//!     → protected without session: SessionProvider::emergency_recovery (once)
//!     → resilience::retries::execute
//!         → attempt: build headers, send with 15s deadline, map status to RequestError
//!         → error.rs (typed error → ErrorClass)
//!     → JSON value or the last real error
//! ```
//!
//! # Design Decisions
//! - Health checks bypass the retry loop entirely
//! - Session headers are re-read on every attempt
//! - Errors are never wrapped on exhaustion

pub mod resilient;
pub mod endpoint;
pub mod error;

pub use resilient::{ClientStatus, RequestOptions, ResilientClient};
pub use endpoint::EndpointKind;
pub use error::{RequestError, RequestResult};
