//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::Router;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use maak_client::config::ClientConfig;
use maak_client::session::{Session, SessionError, SessionInfo, SessionProvider, SessionResult};

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: HeaderMap,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Handle to a running mock backend.
pub struct MockBackend {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockBackend {
    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Serve `router` on an ephemeral local port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Start a backend whose every response is decided by `respond`.
///
/// `respond` receives the zero-based index of the request and the request
/// itself, and returns the status code and body.
pub async fn start_programmable_backend<F>(respond: F) -> MockBackend
where
    F: Fn(usize, &RecordedRequest) -> (u16, String) + Send + Sync + 'static,
{
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorder = requests.clone();
    let respond = Arc::new(respond);

    let handler = move |uri: Uri, headers: HeaderMap| {
        let recorder = recorder.clone();
        let respond = respond.clone();
        async move {
            let recorded = RecordedRequest {
                path: uri.path().to_string(),
                headers,
            };
            let index = {
                let mut seen = recorder.lock().unwrap();
                seen.push(recorded.clone());
                seen.len() - 1
            };
            let (status, body) = respond(index, &recorded);
            (StatusCode::from_u16(status).unwrap(), body)
        }
    };

    let addr = serve(Router::new().fallback(handler)).await;
    MockBackend {
        base_url: format!("http://{}", addr),
        requests,
    }
}

/// An address nothing is listening on.
pub fn dead_address() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Configuration with millisecond-scale retry delays.
pub fn fast_config(base_url: &str) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.api.base_url = base_url.to_string();
    config.api.anon_key = "anon-test-key".to_string();
    config.api.request_timeout_secs = 2;
    config.retry.max_retries = 3;
    config.retry.auth_delay_ms = 10;
    config.retry.network_base_delay_ms = 20;
    config.retry.network_max_delay_ms = 50;
    config.retry.server_delay_ms = 30;
    config.session.store_path = None;
    config
}

/// Session provider with scripted outcomes and call counters.
#[derive(Default)]
pub struct ScriptedSessions {
    current: Mutex<Option<Session>>,
    /// Session installed by a successful refresh; `None` makes refresh fail.
    refresh_to: Mutex<Option<Session>>,
    /// Session installed by emergency recovery; `None` makes it fail.
    emergency_to: Mutex<Option<Session>>,
    pub refresh_calls: AtomicU32,
    pub emergency_calls: AtomicU32,
}

impl ScriptedSessions {
    pub fn with_session(session: Session) -> Self {
        let sessions = Self::default();
        *sessions.current.lock().unwrap() = Some(session);
        sessions
    }

    pub fn refresh_to(self, session: Session) -> Self {
        *self.refresh_to.lock().unwrap() = Some(session);
        self
    }

    pub fn emergency_to(self, session: Session) -> Self {
        *self.emergency_to.lock().unwrap() = Some(session);
        self
    }

    pub fn refreshes(&self) -> u32 {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn emergencies(&self) -> u32 {
        self.emergency_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for ScriptedSessions {
    async fn session_info(&self) -> Option<SessionInfo> {
        self.current.lock().unwrap().as_ref().map(|s| s.info())
    }

    async fn refresh_session(&self) -> SessionResult<Session> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.refresh_to.lock().unwrap().clone();
        match next {
            Some(session) => {
                *self.current.lock().unwrap() = Some(session.clone());
                Ok(session)
            }
            None => Err(SessionError::Expired),
        }
    }

    async fn emergency_recovery(&self) -> SessionResult<Session> {
        self.emergency_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.emergency_to.lock().unwrap().clone();
        match next {
            Some(session) => {
                *self.current.lock().unwrap() = Some(session.clone());
                Ok(session)
            }
            None => Err(SessionError::Missing),
        }
    }
}
