//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! ResilientClient
//!     → provider.rs (SessionProvider trait: info / refresh / emergency recovery)
//!         → store.rs (FileSessionStore: JSON file + in-memory copy)
//!             → types.rs (Session, lifetimes, validity)
//! ```
//!
//! # Design Decisions
//! - The client only reads sessions; creating and persisting them is the provider's job
//! - Demo sessions are fabricated locally and live 24h, real sessions 7d
//! - Expired sessions are treated as absent

pub mod provider;
pub mod store;
pub mod types;

pub use provider::SessionProvider;
pub use store::FileSessionStore;
pub use types::{Session, SessionError, SessionInfo, SessionLifetimes, SessionResult};
