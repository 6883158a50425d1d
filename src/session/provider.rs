//! The auth collaborator consumed by the request client.

use async_trait::async_trait;

use crate::session::types::{Session, SessionInfo, SessionResult};

/// Source of sessions for the request client.
///
/// Implementations own session persistence; the client never writes sessions
/// itself. None of these calls go through the client's retry loop.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The current session if one exists and is still valid.
    async fn session_info(&self) -> Option<SessionInfo>;

    /// Re-validate or renew the current session after the server rejected it.
    async fn refresh_session(&self) -> SessionResult<Session>;

    /// Last-resort session creation when a protected call has no session at all.
    async fn emergency_recovery(&self) -> SessionResult<Session>;
}
