//! # Request Context
//!
//! Value snapshot of the request fields routing needs. It is taken once
//! from the inbound request and never written back: the router keeps its
//! own working copy of the path.

use hyper::header::HOST;
use hyper::http::uri::Authority;
use hyper::Request;
use serde::Serialize;

/// Snapshot of { path, method, host, scheme }
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    path: String,
    method: String,
    host: String,
    scheme: String,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            method: "GET".to_string(),
            host: String::new(),
            scheme: "http".to_string(),
        }
    }
}

impl RequestContext {
    /// Create a context for a path and method
    pub fn new(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            ..Self::default()
        }
    }

    /// Snapshot a hyper request
    ///
    /// The host comes from the URI authority, falling back to the `Host`
    /// header; the port is dropped and IPv6 hosts keep their brackets
    /// (`[::1]`). The scheme comes from the URI, defaulting to `http`.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let uri = request.uri();
        let host = uri
            .host()
            .map(str::to_string)
            .or_else(|| {
                request
                    .headers()
                    .get(HOST)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<Authority>().ok())
                    .map(|authority| authority.host().to_string())
            })
            .unwrap_or_default();

        Self {
            path: uri.path().to_string(),
            method: request.method().as_str().to_string(),
            host,
            scheme: uri.scheme_str().unwrap_or("http").to_string(),
        }
    }

    /// Set the host
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the scheme
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Request path, without query string
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request method token
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request host, empty if unknown
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Request scheme
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }
}
