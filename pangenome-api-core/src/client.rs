//! # PanGenomeAPI Client
//!
//! This module implements the typed client surface of the PanGenomeAPI service.
//!
//! [`PanGenomeClient`] is generic over its [`Transport`]. Production code uses the default
//! [`HttpTransport`]; tests plug in any other implementation through
//! [`PanGenomeClient::from_transport`].
//!
//! Configuration is read-mostly: every operation takes `&self` and can run concurrently,
//! while configuration changes take `&mut self` and are serialized by the caller.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pangenome_api_core::client::PanGenomeClient;
//! use pangenome_api_core::models::SearchGenomesFromPG;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PanGenomeClient::with_token("https://kbase.us/services/pangenome_api", "TOKEN")?;
//!
//! let params = SearchGenomesFromPG::builder()
//!     .pangenome_ref("7/1/1")
//!     .query("dnaA")
//!     .start(0)
//!     .limit(10)
//!     .build();
//!
//! let page = client.search_genomes_from_pangenome(&params, None).await?;
//! println!("{:?} matches", page.num_found());
//! # Ok(())
//! # }
//! ```
mod config;
mod operations;

pub use config::ClientConfig;
pub use operations::methods;

use crate::{
    jsonrpc::client::JsonRpcClient,
    transport::{
        AuthToken, HttpTransport, Transport, TransportConfig, TransportError, parse_service_url,
    },
};
use std::time::Duration;
use url::Url;

/// The main client for the PanGenomeAPI service.
#[derive(Debug, Clone)]
pub struct PanGenomeClient<T = HttpTransport> {
    rpc: JsonRpcClient<T>,
}

impl PanGenomeClient<HttpTransport> {
    /// Creates a client without credentials.
    ///
    /// No connection is opened until the first call.
    pub fn new(url: &str) -> Result<Self, TransportError> {
        Self::build(url, TransportConfig::default(), None)
    }

    /// Creates a client that sends `token` with every call.
    pub fn with_token(url: &str, token: impl Into<String>) -> Result<Self, TransportError> {
        Self::build(url, TransportConfig::default(), Some(AuthToken::new(token)))
    }

    /// Creates a client from a full [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut client = Self::build(
            &config.url,
            config.transport_config(),
            config.token.clone(),
        )?;
        client.set_service_version(config.service_version.clone());
        Ok(client)
    }

    fn build(
        url: &str,
        config: TransportConfig,
        token: Option<AuthToken>,
    ) -> Result<Self, TransportError> {
        let url = parse_service_url(url)?;
        let transport = HttpTransport::new(config, token)?;

        tracing::info!(%url, "created PanGenomeAPI client");

        Ok(Self {
            rpc: JsonRpcClient::new(url, transport),
        })
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.rpc.transport().token()
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.rpc.transport().config().read_timeout
    }

    /// Bounds the wait for a response. `None` or zero waits indefinitely.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), TransportError> {
        let config = self.transport_config().with_read_timeout(timeout);
        self.rpc.transport_mut().reconfigure(config)
    }

    pub fn is_insecure_http_allowed(&self) -> bool {
        self.rpc.transport().config().insecure_http_allowed
    }

    /// Allows credentials to be sent over plaintext `http`. Off by default.
    pub fn set_insecure_http_allowed(&mut self, allowed: bool) -> Result<(), TransportError> {
        let config = TransportConfig {
            insecure_http_allowed: allowed,
            ..self.transport_config()
        };
        self.rpc.transport_mut().reconfigure(config)
    }

    pub fn are_all_certificates_trusted(&self) -> bool {
        self.rpc.transport().config().trust_all_certificates
    }

    /// Trusts every server certificate, self-signed ones included. Off by default.
    pub fn set_all_certificates_trusted(&mut self, trusted: bool) -> Result<(), TransportError> {
        let config = TransportConfig {
            trust_all_certificates: trusted,
            ..self.transport_config()
        };
        self.rpc.transport_mut().reconfigure(config)
    }

    pub fn is_streaming_mode_on(&self) -> bool {
        self.rpc.transport().config().streaming_mode
    }

    /// Streams request bodies in chunks instead of sending them with a fixed length.
    ///
    /// Many servers do not accept chunked requests.
    pub fn set_streaming_mode(&mut self, streaming: bool) -> Result<(), TransportError> {
        let config = TransportConfig {
            streaming_mode: streaming,
            ..self.transport_config()
        };
        self.rpc.transport_mut().reconfigure(config)
    }

    fn transport_config(&self) -> TransportConfig {
        self.rpc.transport().config().clone()
    }
}

impl<T: Transport> PanGenomeClient<T> {
    /// Creates a client over a custom [`Transport`].
    pub fn from_transport(url: &str, transport: T) -> Result<Self, TransportError> {
        let url = parse_service_url(url)?;
        Ok(Self {
            rpc: JsonRpcClient::new(url, transport),
        })
    }

    pub fn url(&self) -> &Url {
        self.rpc.url()
    }

    pub fn transport(&self) -> &T {
        self.rpc.transport()
    }

    /// The pinned service release, `None` meaning the latest one.
    pub fn service_version(&self) -> Option<&str> {
        self.rpc.service_version()
    }

    pub fn set_service_version(&mut self, version: Option<String>) {
        self.rpc.set_service_version(version);
    }
}
