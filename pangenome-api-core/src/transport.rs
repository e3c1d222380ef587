//! # HTTP Transport
//!
//! This module contains the lowest layer of the client: moving one request body to the
//! service endpoint and handing back the raw status and bytes. It knows nothing about
//! JSON-RPC envelopes.
//!
//! The [`Transport`] trait is the seam the dispatcher is generic over. Production code
//! uses [`HttpTransport`] (backed by `reqwest`); tests substitute in-memory doubles.
//!
//! ## Credentials
//!
//! A configured [`AuthToken`] is attached to every request in the `Authorization`
//! header, unless the target URL is plaintext `http` and insecure connections are not
//! allowed. In that case the request fails with [`TransportError::InsecureCredential`]
//! before any network I/O happens.
pub mod client;

pub use client::HttpTransport;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, time::Duration};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid service URL '{url}': '{source}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported URL scheme '{0}', expected 'http' or 'https'")]
    UnsupportedScheme(String),
    #[error(
        "Refusing to send credentials over an insecure http connection to '{0}', enable insecure http connections to allow it"
    )]
    InsecureCredential(Url),
    #[error("The authorization token is not a valid header value")]
    InvalidCredential,
    #[error("Failed to build the HTTP client: '{0}'")]
    ClientBuild(#[source] reqwest::Error),
    #[error("Request to '{url}' timed out: '{source}'")]
    Timeout {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to connect to '{url}': '{source}'")]
    Connect {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request to '{url}' failed: '{source}'")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to open request body file '{path}': '{source}'")]
    BodySource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The payload of an outgoing request.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// Fully encoded in memory. Sent in chunks when streaming mode is on.
    Buffered(Bytes),
    /// Read from disk incrementally while being sent.
    File(PathBuf),
}

impl From<Vec<u8>> for RequestBody {
    fn from(value: Vec<u8>) -> Self {
        RequestBody::Buffered(Bytes::from(value))
    }
}

/// A single POST to the service endpoint.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

/// The raw reply to an [`HttpRequest`]. Non-2xx statuses are still responses.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Knobs controlling how [`HttpTransport`] talks to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportConfig {
    /// Upper bound on each wait for data from the server once the request is sent, the
    /// response headers and every body read alike. `None` waits indefinitely.
    pub read_timeout: Option<Duration>,
    /// Allow credentials to travel over plaintext `http`.
    pub insecure_http_allowed: bool,
    /// Accept any server certificate, including self-signed ones.
    pub trust_all_certificates: bool,
    /// Stream request bodies from disk with chunked transfer encoding instead of sending
    /// them from memory with a fixed length.
    pub streaming_mode: bool,
}

impl TransportConfig {
    /// Sets the read timeout. A zero duration means no timeout.
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout.filter(|t| !t.is_zero());
        self
    }
}

/// An opaque authorization credential.
///
/// The value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Moves one request to the server and returns its raw response.
///
/// Implementations must not retry: remote operations are treated as non-idempotent.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    /// When true, callers spool request bodies to disk and send [`RequestBody::File`].
    fn streams_request_bodies(&self) -> bool {
        false
    }
}

/// Parses a service URL, accepting only `http` and `https`.
pub fn parse_service_url(url: &str) -> Result<Url, TransportError> {
    let parsed = Url::parse(url).map_err(|source| TransportError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(TransportError::UnsupportedScheme(other.to_string())),
    }
}

/// Fails when a credential would be sent over plaintext `http` without permission.
pub fn ensure_credential_allowed(
    url: &Url,
    insecure_http_allowed: bool,
) -> Result<(), TransportError> {
    if url.scheme() == "http" && !insecure_http_allowed {
        return Err(TransportError::InsecureCredential(url.clone()));
    }
    Ok(())
}
