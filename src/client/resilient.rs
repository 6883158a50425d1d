//! Resilient JSON API client.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::client::endpoint::EndpointKind;
use crate::client::error::{RequestError, RequestResult};
use crate::config::ClientConfig;
use crate::observability::metrics;
use crate::resilience::retries::{self, RetryPolicy, RetryTimings};
use crate::resilience::timeouts::with_timeout;
use crate::session::SessionProvider;

// Header names are case-insensitive; `HeaderName` stores them lowercase.
pub const SESSION_ID_HEADER: &str = "x-session-id";
pub const USER_ID_HEADER: &str = "x-user-id";
pub const IS_DEMO_HEADER: &str = "x-is-demo";

const HEALTH_ENDPOINT: &str = "/health";

/// Method, body and extra headers for one call.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post(body: Value) -> Self {
        Self::new(Method::POST).with_body(body)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

/// Snapshot of the client's retry policy and session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientStatus {
    pub auto_retry_enabled: bool,
    pub max_retries: u32,
    pub has_valid_session: bool,
    /// `"authenticated"`, `"demo"` or `"none"`.
    pub session_type: &'static str,
    pub user_id: Option<String>,
    /// True only for a valid non-demo session.
    pub is_authenticated: bool,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    timeout: Duration,
    policy: RetryPolicy,
    timings: RetryTimings,
    sessions: Arc<dyn SessionProvider>,
}

/// JSON API client that recovers from expired sessions, network failures and
/// 5xx responses.
///
/// Cloning is cheap; clones share the retry policy and session provider.
#[derive(Clone)]
pub struct ResilientClient {
    inner: Arc<ClientInner>,
}

impl ResilientClient {
    /// Create a client from configuration and a session provider.
    pub fn new(config: &ClientConfig, sessions: Arc<dyn SessionProvider>) -> Self {
        let inner = ClientInner {
            http: reqwest::Client::new(),
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            anon_key: config.api.anon_key.clone(),
            timeout: Duration::from_secs(config.api.request_timeout_secs),
            policy: RetryPolicy::from(&config.retry),
            timings: RetryTimings::from(&config.retry),
            sessions,
        };

        tracing::debug!(
            base_url = %inner.base_url,
            auto_retry = inner.policy.auto_retry_enabled(),
            max_retries = inner.policy.max_retries(),
            "Request client initialized"
        );

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Perform a request, retrying recoverable failures per the retry policy.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> RequestResult<Value> {
        let kind = EndpointKind::classify(endpoint);
        let start = Instant::now();

        if kind.is_protected() {
            self.ensure_session(endpoint).await;
        }

        let this = self;
        let options = &options;
        let result = retries::execute(
            &self.inner.policy,
            &self.inner.timings,
            endpoint,
            move |attempt| this.attempt(endpoint, kind, options, attempt),
            move || this.recover_session(endpoint),
        )
        .await;

        let outcome = if result.is_ok() { "success" } else { "failure" };
        metrics::record_request(kind.as_str(), outcome, start);
        result
    }

    pub async fn get(&self, endpoint: &str) -> RequestResult<Value> {
        self.request(endpoint, RequestOptions::get()).await
    }

    pub async fn post(&self, endpoint: &str, body: Value) -> RequestResult<Value> {
        self.request(endpoint, RequestOptions::post(body)).await
    }

    pub async fn put(&self, endpoint: &str, body: Value) -> RequestResult<Value> {
        self.request(endpoint, RequestOptions::new(Method::PUT).with_body(body))
            .await
    }

    pub async fn delete(&self, endpoint: &str) -> RequestResult<Value> {
        self.request(endpoint, RequestOptions::new(Method::DELETE)).await
    }

    /// GET `endpoint` and deserialize the response into `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> RequestResult<T> {
        let value = self.get(endpoint).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Call `/health` once, bypassing retries and session recovery.
    pub async fn health_check(&self) -> RequestResult<Value> {
        let start = Instant::now();
        let result = self
            .attempt(HEALTH_ENDPOINT, EndpointKind::Public, &RequestOptions::get(), 0)
            .await;

        let outcome = if result.is_ok() { "success" } else { "failure" };
        metrics::record_request("health", outcome, start);
        result
    }

    pub fn set_auto_retry(&self, enabled: bool) {
        self.inner.policy.set_auto_retry(enabled);
        tracing::info!(enabled, "Auto retry updated");
    }

    /// Set the attempt cap, clamped into `[1, 10]`. Returns the stored value.
    pub fn set_max_retries(&self, max_retries: i64) -> u32 {
        let stored = self.inner.policy.set_max_retries(max_retries);
        tracing::info!(requested = max_retries, stored, "Max retries updated");
        stored
    }

    pub async fn client_status(&self) -> ClientStatus {
        let session = self.inner.sessions.session_info().await;
        let session_type = match &session {
            Some(info) if info.is_demo => "demo",
            Some(_) => "authenticated",
            None => "none",
        };

        ClientStatus {
            auto_retry_enabled: self.inner.policy.auto_retry_enabled(),
            max_retries: self.inner.policy.max_retries(),
            has_valid_session: session.is_some(),
            session_type,
            is_authenticated: session.as_ref().is_some_and(|info| !info.is_demo),
            user_id: session.map(|info| info.user_id),
        }
    }

    /// Make sure a protected call has a session, recovering one if needed.
    ///
    /// Never fails: without a session the request goes out anyway and the
    /// server's 401 drives the normal auth retry.
    async fn ensure_session(&self, endpoint: &str) {
        if self.inner.sessions.session_info().await.is_some() {
            return;
        }

        tracing::warn!(endpoint, "No valid session for protected endpoint, attempting emergency recovery");
        match self.inner.sessions.emergency_recovery().await {
            Ok(session) => {
                tracing::info!(
                    endpoint,
                    user_id = %session.user_id,
                    is_demo = session.is_demo,
                    "Emergency session recovery succeeded"
                );
            }
            Err(e) => {
                tracing::warn!(
                    endpoint,
                    error = %e,
                    "Emergency session recovery failed, sending request without session"
                );
            }
        }
    }

    async fn recover_session(&self, endpoint: &str) -> bool {
        match self.inner.sessions.refresh_session().await {
            Ok(session) => {
                tracing::info!(endpoint, user_id = %session.user_id, "Session refreshed");
                true
            }
            Err(e) => {
                tracing::warn!(endpoint, error = %e, "Session refresh failed");
                false
            }
        }
    }

    async fn attempt(
        &self,
        endpoint: &str,
        kind: EndpointKind,
        options: &RequestOptions,
        attempt: u32,
    ) -> RequestResult<Value> {
        let url = self.url_for(endpoint)?;

        let headers = self.build_headers(kind, options).await?;
        let mut builder = self
            .inner
            .http
            .request(options.method.clone(), url)
            .headers(headers);

        if let Some(body) = &options.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        tracing::debug!(
            endpoint,
            method = %options.method,
            attempt,
            kind = kind.as_str(),
            "Sending request"
        );

        let (status, text) = with_timeout(self.inner.timeout, async {
            let response = builder.send().await?;
            let status = response.status();
            let text = response.text().await?;
            Ok::<_, RequestError>((status, text))
        })
        .await?;

        if !status.is_success() {
            return Err(RequestError::from_status(status, &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Defaults, then session headers, then caller headers; later entries
    /// replace earlier ones with the same name.
    async fn build_headers(
        &self,
        kind: EndpointKind,
        options: &RequestOptions,
    ) -> RequestResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", self.inner.anon_key))?,
        );

        // Read per attempt so a refreshed session is picked up on retry.
        if kind.is_protected() {
            if let Some(info) = self.inner.sessions.session_info().await {
                let session_headers = [
                    (SESSION_ID_HEADER, info.session_id),
                    (USER_ID_HEADER, info.user_id),
                    (IS_DEMO_HEADER, info.is_demo.to_string()),
                ];
                for (name, value) in session_headers {
                    headers.insert(HeaderName::from_static(name), header_value(&value)?);
                }
            }
        }

        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RequestError::InvalidRequest(format!("header '{}': {}", name, e)))?;
            headers.insert(name, header_value(value)?);
        }

        Ok(headers)
    }

    fn url_for(&self, endpoint: &str) -> RequestResult<Url> {
        if endpoint.is_empty() {
            return Err(RequestError::InvalidEndpoint(endpoint.to_string()));
        }

        let joined = if endpoint.starts_with('/') {
            format!("{}{}", self.inner.base_url, endpoint)
        } else {
            format!("{}/{}", self.inner.base_url, endpoint)
        };

        Url::parse(&joined).map_err(|_| RequestError::InvalidEndpoint(endpoint.to_string()))
    }
}

fn header_value(value: &str) -> RequestResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| RequestError::InvalidRequest(format!("header value: {}", e)))
}

impl std::fmt::Debug for ResilientClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientClient")
            .field("base_url", &self.inner.base_url)
            .field("timeout_secs", &self.inner.timeout.as_secs())
            .field("auto_retry_enabled", &self.inner.policy.auto_retry_enabled())
            .field("max_retries", &self.inner.policy.max_retries())
            .finish()
    }
}
