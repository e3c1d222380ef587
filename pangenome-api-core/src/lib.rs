//! # PanGenomeAPI Core
//!
//! `pangenome-api-core` is a typed client for the KBase PanGenomeAPI service. It searches
//! orthologs and genome features inside a stored pangenome, and families, functions and
//! genomes inside a stored genome comparison, by calling the service over JSON-RPC 1.1.
//!
//! ## Key Components
//!
//! * **[`PanGenomeClient`]:** The main entry point. One async method per remote
//!   operation, plus the connection settings (credential, timeouts, TLS, streaming,
//!   pinned service version).
//! * **[`models`]:** The records exchanged with the service. Every field is optional and
//!   unknown fields survive a decode/encode cycle.
//!
//! ## Internal layers
//!
//! The layers the client is built from are public too:
//!
//! * **[`jsonrpc::client::JsonRpcClient`]:** Sends one call and unwraps one result,
//!   routing it to the pinned service release.
//! * **[`transport::Transport`]:** Moves raw bytes to the endpoint. [`HttpTransport`] is
//!   the `reqwest` implementation; anything else can be plugged in with
//!   [`PanGenomeClient::from_transport`].
//!
//! See the README.md for more details about usage.
pub mod client;
pub mod jsonrpc;
pub mod models;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::{ClientConfig, PanGenomeClient};
pub use jsonrpc::client::{CallError, ProtocolError};
pub use jsonrpc::codec::RemoteError;
pub use transport::{AuthToken, HttpTransport, TransportError};
