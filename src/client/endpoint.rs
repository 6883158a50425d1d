//! Endpoint classification.
//!
//! # Design Decisions
//! - Protected = the path contains one of the session-bound segments
//! - Substring match on the path only. The query string and fragment are
//!   stripped first, so `/search?next=/profile` is public: a segment named in
//!   a query parameter does not make the call session-bound
//! - Matching is case-sensitive, like the API's routes

/// Path segments that require session headers.
pub const PROTECTED_SEGMENTS: &[&str] = &[
    "/matches",
    "/profile",
    "/personality",
    "/community",
    "/privacy",
];

/// Whether an endpoint needs session headers beyond the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    Public,
    Protected,
}

impl EndpointKind {
    pub fn classify(endpoint: &str) -> Self {
        let path = endpoint.split(['?', '#']).next().unwrap_or(endpoint);
        if PROTECTED_SEGMENTS.iter().any(|segment| path.contains(segment)) {
            EndpointKind::Protected
        } else {
            EndpointKind::Public
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, EndpointKind::Protected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointKind::Public => "public",
            EndpointKind::Protected => "protected",
        }
    }
}
