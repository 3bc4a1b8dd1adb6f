//! Shared types for routing and describing RPC calls.
//!
//! Contains the endpoint routing key (`EndpointName`), the HTTP verb
//! (`HttpVerb`), the per-call request description (`RpcRequest`), the
//! parameter/result map aliases, and the facade's `BlockId` selector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Parameters sent as the JSON body of an RPC call.
pub type RpcParams = serde_json::Map<String, serde_json::Value>;

/// Normalized response body of an RPC call. Keys carry no implicit schema;
/// an empty map means the endpoint returned no usable data.
pub type RpcResult = serde_json::Map<String, serde_json::Value>;

// ==============================================================================
// Endpoint Name
// ==============================================================================

/// The logical node services a client can talk to.
///
/// The derived `Ord` is the stable configuration order used when scanning
/// endpoints: full node first, wallet second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointName {
    FullNode,
    WalletServer,
}

impl EndpointName {
    pub const ALL: [EndpointName; 2] = [EndpointName::FullNode, EndpointName::WalletServer];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullNode => "full_node",
            Self::WalletServer => "wallet_server",
        }
    }
}

impl fmt::Display for EndpointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==============================================================================
// HTTP Verb
// ==============================================================================

/// The two HTTP methods the node RPC servers accept.
///
/// `Get` is the default, matching the provider-level default used for
/// health probes. Routed calls through the manager default to `Post`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    #[default]
    Get,
    Post,
}

impl HttpVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpVerb {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("GET") {
            Ok(Self::Get)
        } else if s.eq_ignore_ascii_case("POST") {
            Ok(Self::Post)
        } else {
            Err(CoreError::UnsupportedMethod(s.to_owned()))
        }
    }
}

// ==============================================================================
// RPC Request
// ==============================================================================

/// One routed RPC call: method path, JSON parameters, target endpoint and
/// verb. Built per call and consumed by `ConnectionManager::send`.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub method: String,
    pub params: RpcParams,
    pub endpoint: EndpointName,
    pub verb: HttpVerb,
}

impl RpcRequest {
    /// A `POST` to the full node with no parameters.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: RpcParams::new(),
            endpoint: EndpointName::FullNode,
            verb: HttpVerb::Post,
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn params(mut self, params: RpcParams) -> Self {
        self.params = params;
        self
    }

    pub fn endpoint(mut self, endpoint: EndpointName) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn verb(mut self, verb: HttpVerb) -> Self {
        self.verb = verb;
        self
    }
}

// ==============================================================================
// Block Identifier
// ==============================================================================

/// Selects a block for the facade's block-record lookups.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BlockId {
    /// The current peak of the chain.
    #[default]
    Latest,
    Height(u32),
    /// A `0x`-prefixed header hash.
    Hash(String),
}

impl FromStr for BlockId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("latest") {
            return Ok(Self::Latest);
        }
        if let Ok(height) = s.parse::<u32>() {
            return Ok(Self::Height(height));
        }
        if is_header_hash(s) {
            return Ok(Self::Hash(s.to_ascii_lowercase()));
        }
        Err(CoreError::InvalidBlockId(s.to_owned()))
    }
}

/// `0x` followed by 64 hex digits, the shape of header hashes and puzzle
/// hashes on the wire.
pub fn is_header_hash(s: &str) -> bool {
    s.len() == 66
        && s.starts_with("0x")
        && s[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verb_parsing_is_case_insensitive() {
        assert_eq!("get".parse::<HttpVerb>().unwrap(), HttpVerb::Get);
        assert_eq!("Post".parse::<HttpVerb>().unwrap(), HttpVerb::Post);
        assert_eq!("POST".parse::<HttpVerb>().unwrap(), HttpVerb::Post);
    }

    #[test]
    fn verb_parsing_rejects_put() {
        let err = "PUT".parse::<HttpVerb>().expect_err("PUT must be rejected");
        assert!(matches!(err, CoreError::UnsupportedMethod(ref m) if m == "PUT"));
    }

    #[test]
    fn endpoint_order_is_full_node_first() {
        assert!(EndpointName::FullNode < EndpointName::WalletServer);
        assert_eq!(EndpointName::ALL[0], EndpointName::FullNode);
    }

    #[test]
    fn request_defaults_to_full_node_post() {
        let req = RpcRequest::new("get_blockchain_state");
        assert_eq!(req.endpoint, EndpointName::FullNode);
        assert_eq!(req.verb, HttpVerb::Post);
        assert!(req.params.is_empty());
    }

    #[test]
    fn block_id_parses_latest_height_and_hash() {
        assert_eq!("latest".parse::<BlockId>().unwrap(), BlockId::Latest);
        assert_eq!("1200".parse::<BlockId>().unwrap(), BlockId::Height(1200));

        let hash = format!("0x{}", "ab".repeat(32));
        assert_eq!(hash.parse::<BlockId>().unwrap(), BlockId::Hash(hash.clone()));
    }

    #[test]
    fn block_id_rejects_garbage() {
        assert!(matches!(
            "0x1234".parse::<BlockId>(),
            Err(CoreError::InvalidBlockId(_))
        ));
        assert!(matches!(
            "-5".parse::<BlockId>(),
            Err(CoreError::InvalidBlockId(_))
        ));
    }
}
