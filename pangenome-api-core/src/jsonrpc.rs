//! # JSON-RPC Layer
//!
//! The building blocks between the typed client surface and the raw HTTP transport:
//!
//! * [`codec`]: request envelope encoding and response envelope decoding.
//! * [`client`]: the versioned dispatcher that drives one call through the codec and the
//!   transport and maps every failure onto [`client::CallError`].
pub mod client;
pub mod codec;
