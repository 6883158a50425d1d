//! Resilient request client for the MÄÄK Mood API.

pub mod client;
pub mod config;
pub mod observability;
pub mod resilience;
pub mod session;

pub use client::{RequestError, RequestOptions, ResilientClient};
pub use config::ClientConfig;
pub use session::{FileSessionStore, SessionProvider};
