//! HTTPS provider for Chia RPC endpoints.
//!
//! Implements [`EndpointProvider`](super::EndpointProvider) with `reqwest`:
//! URL/header/identity validation at construction, mutual-TLS client
//! identity, lenient server-certificate handling and response normalization.

mod client;
mod connection;
mod protocol;

pub use client::HttpProvider;
