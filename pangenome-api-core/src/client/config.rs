use crate::transport::{AuthToken, TransportConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything needed to build a [`super::PanGenomeClient`], in a serde-friendly shape.
///
/// Missing keys fall back to the defaults: no credential, no timeout, no insecure
/// connections, certificates verified, no streaming, latest service release.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub url: String,
    pub token: Option<AuthToken>,
    /// Read timeout in milliseconds. `0` or absent waits indefinitely.
    pub read_timeout_ms: Option<u64>,
    pub insecure_http_allowed: bool,
    pub trust_all_certificates: bool,
    pub streaming_mode: bool,
    pub service_version: Option<String>,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            insecure_http_allowed: self.insecure_http_allowed,
            trust_all_certificates: self.trust_all_certificates,
            streaming_mode: self.streaming_mode,
            ..TransportConfig::default()
        }
        .with_read_timeout(self.read_timeout_ms.map(Duration::from_millis))
    }
}
