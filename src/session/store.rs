//! File-backed session store.
//!
//! Keeps the current session in memory and writes every change through to a
//! JSON file so a session survives process restarts.

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::config::SessionConfig;
use crate::observability::metrics;
use crate::session::provider::SessionProvider;
use crate::session::types::{Session, SessionError, SessionInfo, SessionLifetimes, SessionResult};

/// Session store backed by an optional JSON file.
#[derive(Debug)]
pub struct FileSessionStore {
    path: Option<PathBuf>,
    lifetimes: SessionLifetimes,
    current: RwLock<Option<Session>>,
}

impl FileSessionStore {
    /// Create a store that never touches disk.
    pub fn in_memory(lifetimes: SessionLifetimes) -> Self {
        Self {
            path: None,
            lifetimes,
            current: RwLock::new(None),
        }
    }

    /// Open a store at `path`, reading the session it holds if the file exists.
    pub fn load(path: impl AsRef<Path>, lifetimes: SessionLifetimes) -> SessionResult<Self> {
        let path = path.as_ref().to_path_buf();
        let current = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                None
            } else {
                let session: Session = serde_json::from_str(&content)?;
                tracing::debug!(
                    path = %path.display(),
                    is_demo = session.is_demo,
                    "Loaded session from store"
                );
                Some(session)
            }
        } else {
            None
        };

        Ok(Self {
            path: Some(path),
            lifetimes,
            current: RwLock::new(current),
        })
    }

    /// Build a store from configuration.
    pub fn from_config(config: &SessionConfig) -> SessionResult<Self> {
        let lifetimes = SessionLifetimes::from(config);
        match &config.store_path {
            Some(path) => Self::load(path, lifetimes),
            None => Ok(Self::in_memory(lifetimes)),
        }
    }

    pub fn lifetimes(&self) -> &SessionLifetimes {
        &self.lifetimes
    }

    /// The stored session, whether or not it is still valid.
    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The stored session if it is still valid.
    pub fn valid_session(&self) -> SessionResult<Session> {
        match self.current() {
            Some(session) if session.is_valid(&self.lifetimes) => Ok(session),
            Some(_) => Err(SessionError::Expired),
            None => Err(SessionError::Missing),
        }
    }

    /// Replace the stored session and persist it.
    pub fn store(&self, session: Session) -> SessionResult<()> {
        self.persist(&session)?;
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(session);
        Ok(())
    }

    /// Remove the stored session from memory and disk.
    pub fn clear(&self) -> SessionResult<()> {
        if let Some(path) = &self.path {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        tracing::info!("Session cleared");
        Ok(())
    }

    /// Fabricate, persist and return a fresh demo session.
    pub fn create_demo_session(&self) -> SessionResult<Session> {
        let session = Session::demo();
        self.store(session.clone())?;
        tracing::info!(user_id = %session.user_id, "Created demo session");
        Ok(session)
    }

    fn persist(&self, session: &Session) -> SessionResult<()> {
        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(session).map_err(SessionError::Encode)?;
            fs::write(path, json)?;
        }
        Ok(())
    }
}

#[async_trait]
impl SessionProvider for FileSessionStore {
    async fn session_info(&self) -> Option<SessionInfo> {
        self.valid_session().ok().map(|session| session.info())
    }

    async fn refresh_session(&self) -> SessionResult<Session> {
        let result = self.valid_session();
        match &result {
            Ok(session) => {
                tracing::debug!(user_id = %session.user_id, "Session refresh found a valid session");
                metrics::record_session_recovery("refresh", "success");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session refresh failed");
                metrics::record_session_recovery("refresh", "failure");
            }
        }
        result
    }

    async fn emergency_recovery(&self) -> SessionResult<Session> {
        if let Ok(session) = self.valid_session() {
            return Ok(session);
        }

        tracing::warn!("No valid session, falling back to a demo session");
        let result = self.create_demo_session();
        let outcome = if result.is_ok() { "success" } else { "failure" };
        metrics::record_session_recovery("emergency", outcome);
        result
    }
}
