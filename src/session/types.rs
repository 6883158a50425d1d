//! Session types and error definitions.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SessionConfig;

/// An authentication session as persisted by the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
    pub is_demo: bool,
    /// Creation time in seconds since the Unix epoch.
    pub created_at: u64,
}

impl Session {
    /// Create a regular session stamped with the current time.
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            is_demo: false,
            created_at: unix_now(),
        }
    }

    /// Fabricate a local demo session.
    pub fn demo() -> Self {
        Self {
            session_id: format!("demo-{}", Uuid::new_v4()),
            user_id: format!("demo-user-{}", Uuid::new_v4()),
            is_demo: true,
            created_at: unix_now(),
        }
    }

    /// Check validity against an explicit clock reading.
    ///
    /// A `created_at` ahead of `now` (clock skew) counts as age zero.
    pub fn is_valid_at(&self, now: u64, lifetimes: &SessionLifetimes) -> bool {
        let max_age = lifetimes.max_age_for(self.is_demo).as_secs();
        now.saturating_sub(self.created_at) < max_age
    }

    /// Check validity against the current time.
    pub fn is_valid(&self, lifetimes: &SessionLifetimes) -> bool {
        self.is_valid_at(unix_now(), lifetimes)
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.session_id.clone(),
            user_id: self.user_id.clone(),
            is_demo: self.is_demo,
        }
    }
}

/// The header-facing view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub user_id: String,
    pub is_demo: bool,
}

/// Maximum ages for demo and regular sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLifetimes {
    pub demo_max_age: Duration,
    pub max_age: Duration,
}

impl SessionLifetimes {
    pub fn max_age_for(&self, is_demo: bool) -> Duration {
        if is_demo {
            self.demo_max_age
        } else {
            self.max_age
        }
    }
}

impl Default for SessionLifetimes {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

impl From<&SessionConfig> for SessionLifetimes {
    fn from(config: &SessionConfig) -> Self {
        Self {
            demo_max_age: Duration::from_secs(config.demo_max_age_secs),
            max_age: Duration::from_secs(config.max_age_secs),
        }
    }
}

/// Errors that can occur while reading or recovering a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No session is stored.
    #[error("no stored session")]
    Missing,

    /// A session is stored but past its maximum age.
    #[error("stored session expired")]
    Expired,

    /// Reading or writing the session file failed.
    #[error("session store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The session file could not be parsed.
    #[error("corrupt session file: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The session could not be serialized for writing.
    #[error("failed to serialize session: {0}")]
    Encode(serde_json::Error),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: u64 = 60 * 60;

    #[test]
    fn test_demo_session_expires_after_a_day() {
        let lifetimes = SessionLifetimes::default();
        let mut session = Session::demo();
        session.created_at = 1_000_000;

        assert!(session.is_valid_at(1_000_000 + 23 * HOUR, &lifetimes));
        assert!(!session.is_valid_at(1_000_000 + 24 * HOUR, &lifetimes));
    }

    #[test]
    fn test_regular_session_lives_a_week() {
        let lifetimes = SessionLifetimes::default();
        let mut session = Session::new("sess-1", "user-1");
        session.created_at = 1_000_000;

        assert!(session.is_valid_at(1_000_000 + 6 * 24 * HOUR, &lifetimes));
        assert!(!session.is_valid_at(1_000_000 + 7 * 24 * HOUR, &lifetimes));
    }

    #[test]
    fn test_skewed_future_timestamp_stays_valid() {
        let lifetimes = SessionLifetimes::default();
        let mut session = Session::new("sess-1", "user-1");
        session.created_at = 1_000_005;

        assert!(session.is_valid_at(1_000_000, &lifetimes));
        assert!(session.is_valid_at(1_000_005 + 6 * 24 * HOUR, &lifetimes));
    }

    #[test]
    fn test_demo_ids_are_prefixed_and_unique() {
        let a = Session::demo();
        let b = Session::demo();
        assert!(a.is_demo);
        assert!(a.session_id.starts_with("demo-"));
        assert_ne!(a.session_id, b.session_id);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(SessionError::Missing.to_string(), "no stored session");
        assert_eq!(SessionError::Expired.to_string(), "stored session expired");

        let json_err = serde_json::from_str::<Session>("{").unwrap_err();
        assert!(SessionError::Encode(json_err)
            .to_string()
            .starts_with("failed to serialize session: "));
    }
}
