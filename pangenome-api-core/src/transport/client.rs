//! # reqwest-backed Transport
//!
//! [`HttpTransport`] owns a `reqwest::Client` built from a [`TransportConfig`]. The client
//! is rebuilt every time the configuration changes, so a pooled connection opened under
//! one timeout or trust policy is never reused under another.
use super::{
    AuthToken, HttpRequest, HttpResponse, RequestBody, Transport, TransportConfig, TransportError,
    ensure_credential_allowed,
};
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{AUTHORIZATION, HeaderValue};
use url::Url;

const STREAM_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: TransportConfig,
    token: Option<AuthToken>,
}

impl HttpTransport {
    pub fn new(config: TransportConfig, token: Option<AuthToken>) -> Result<Self, TransportError> {
        let client = build_client(&config)?;
        Ok(Self {
            client,
            config,
            token,
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    /// Replaces the configuration and rebuilds the underlying HTTP client.
    pub fn reconfigure(&mut self, config: TransportConfig) -> Result<(), TransportError> {
        if config == self.config {
            return Ok(());
        }

        self.client = build_client(&config)?;
        self.config = config;
        tracing::info!(config = ?self.config, "rebuilt http transport");
        Ok(())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest { url, headers, body } = request;

        let mut builder = self.client.post(url.clone()).headers(headers);

        if let Some(token) = &self.token {
            ensure_credential_allowed(&url, self.config.insecure_http_allowed)?;
            let mut value = HeaderValue::from_str(token.as_str())
                .map_err(|_| TransportError::InvalidCredential)?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }

        let body = match body {
            RequestBody::Buffered(bytes) if self.config.streaming_mode => {
                let chunks = chunked(bytes).into_iter().map(Ok::<_, std::io::Error>);
                reqwest::Body::wrap_stream(futures_util::stream::iter(chunks))
            }
            RequestBody::Buffered(bytes) => reqwest::Body::from(bytes),
            RequestBody::File(path) => {
                let file = tokio::fs::File::open(&path)
                    .await
                    .map_err(|source| TransportError::BodySource { path, source })?;
                reqwest::Body::from(file)
            }
        };

        let response = builder
            .body(body)
            .send()
            .await
            .map_err(|source| classify(&url, source))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|source| classify(&url, source))?;

        tracing::debug!(%url, %status, bytes = body.len(), "received http response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
    fn streams_request_bodies(&self) -> bool {
        self.config.streaming_mode
    }
}

fn build_client(config: &TransportConfig) -> Result<reqwest::Client, TransportError> {
    let mut builder =
        reqwest::Client::builder().danger_accept_invalid_certs(config.trust_all_certificates);

    // Bounds each read, not the whole exchange.
    if let Some(timeout) = config.read_timeout {
        builder = builder.read_timeout(timeout);
    }

    builder.build().map_err(TransportError::ClientBuild)
}

fn classify(url: &Url, source: reqwest::Error) -> TransportError {
    let url = url.clone();
    if source.is_timeout() {
        TransportError::Timeout { url, source }
    } else if source.is_connect() {
        TransportError::Connect { url, source }
    } else {
        TransportError::Request { url, source }
    }
}

fn chunked(body: Bytes) -> Vec<Bytes> {
    (0..body.len())
        .step_by(STREAM_CHUNK_SIZE)
        .map(|start| body.slice(start..(start + STREAM_CHUNK_SIZE).min(body.len())))
        .collect()
}
