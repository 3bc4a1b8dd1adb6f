//! Named endpoint providers and call routing.
//!
//! A [`ConnectionManager`] owns one provider per configured [`EndpointName`]
//! and is the single funnel through which every facade call reaches the
//! network. Providers are resolved once at construction from a
//! [`ProviderSpec`] and never re-inspected afterwards.

use std::collections::BTreeMap;
use std::fmt;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::provider::{EndpointProvider, HttpProvider};
use crate::types::{EndpointName, HttpVerb, RpcParams, RpcRequest, RpcResult};

pub const DEFAULT_FULL_NODE_URL: &str = "https://localhost:8555";
pub const DEFAULT_WALLET_URL: &str = "https://localhost:9256";

pub const FULL_NODE_STATUS_PAGE: &str = "get_blockchain_state";
pub const WALLET_STATUS_PAGE: &str = "get_sync_status";

fn default_address(name: EndpointName) -> &'static str {
    match name {
        EndpointName::FullNode => DEFAULT_FULL_NODE_URL,
        EndpointName::WalletServer => DEFAULT_WALLET_URL,
    }
}

fn status_page_for(name: EndpointName) -> &'static str {
    match name {
        EndpointName::FullNode => FULL_NODE_STATUS_PAGE,
        EndpointName::WalletServer => WALLET_STATUS_PAGE,
    }
}

// ==============================================================================
// Provider Spec
// ==============================================================================

/// How the manager should obtain the provider for one endpoint.
pub enum ProviderSpec {
    /// Use the endpoint's built-in default address.
    Unset,
    /// Use this address with default certificate, timeout and headers.
    Address(String),
    /// Use a caller-built provider as-is.
    Prebuilt(Box<dyn EndpointProvider>),
}

impl ProviderSpec {
    pub fn prebuilt(provider: impl EndpointProvider + 'static) -> Self {
        Self::Prebuilt(Box::new(provider))
    }
}

impl From<&str> for ProviderSpec {
    fn from(address: &str) -> Self {
        Self::Address(address.to_owned())
    }
}

impl From<String> for ProviderSpec {
    fn from(address: String) -> Self {
        Self::Address(address)
    }
}

impl From<Option<String>> for ProviderSpec {
    fn from(address: Option<String>) -> Self {
        address.map_or(Self::Unset, Self::Address)
    }
}

impl fmt::Debug for ProviderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("Unset"),
            Self::Address(address) => f.debug_tuple("Address").field(address).finish(),
            Self::Prebuilt(provider) => f.debug_tuple("Prebuilt").field(&provider.base_url()).finish(),
        }
    }
}

fn resolve_provider(
    name: EndpointName,
    spec: ProviderSpec,
) -> Result<Box<dyn EndpointProvider>, CoreError> {
    match spec {
        ProviderSpec::Unset => Ok(Box::new(HttpProvider::from_url(default_address(name))?)),
        ProviderSpec::Address(address) => Ok(Box::new(HttpProvider::from_url(&address)?)),
        ProviderSpec::Prebuilt(provider) => Ok(provider),
    }
}

// ==============================================================================
// Connection Manager
// ==============================================================================

/// Owns the named providers and routes calls to them.
///
/// Routing only needs `&self`, so a manager can be shared behind an `Arc`
/// by concurrent tasks. Configuration is fixed at construction.
pub struct ConnectionManager {
    providers: BTreeMap<EndpointName, Box<dyn EndpointProvider>>,
}

impl ConnectionManager {
    /// Resolve each spec into a provider and assign its health-check path
    /// (`get_blockchain_state` for the full node, `get_sync_status` for the
    /// wallet). Endpoints absent from `specs` stay unconfigured.
    pub fn new(
        specs: impl IntoIterator<Item = (EndpointName, ProviderSpec)>,
    ) -> Result<Self, CoreError> {
        let mut providers = BTreeMap::new();
        for (name, spec) in specs {
            let mut provider = resolve_provider(name, spec)?;
            provider.set_status_page(status_page_for(name));
            debug!(
                endpoint = %name,
                base_url = provider.base_url(),
                status_page = provider.status_page(),
                "endpoint configured"
            );
            providers.insert(name, provider);
        }
        Ok(Self { providers })
    }

    /// Both endpoints at their default local addresses.
    pub fn with_defaults() -> Result<Self, CoreError> {
        Self::new(EndpointName::ALL.map(|name| (name, ProviderSpec::Unset)))
    }

    /// Route one call to `endpoint` and pass the provider's result back
    /// untouched.
    pub async fn request(
        &self,
        method: &str,
        params: &RpcParams,
        endpoint: EndpointName,
        verb: HttpVerb,
    ) -> Result<RpcResult, CoreError> {
        let provider = self.provider(endpoint)?;
        debug!(%endpoint, rpc.method = method, rpc.verb = %verb, "routing rpc call");
        provider.request(method, params, verb).await
    }

    pub async fn send(&self, request: &RpcRequest) -> Result<RpcResult, CoreError> {
        self.request(
            &request.method,
            &request.params,
            request.endpoint,
            request.verb,
        )
        .await
    }

    /// Probe every configured endpoint, in configuration order.
    ///
    /// Probes run concurrently; each result is kept separately so one
    /// failing endpoint does not hide the state of the others.
    pub async fn probe_all(&self) -> Vec<(EndpointName, Result<bool, CoreError>)> {
        let probes = self.providers.iter().map(|(name, provider)| async move {
            (*name, provider.is_connected().await)
        });
        join_all(probes).await
    }

    /// Connectivity of every configured endpoint, in configuration order.
    ///
    /// A probe that fails is logged and reported as `false`.
    pub async fn is_connected(&self) -> Vec<(EndpointName, bool)> {
        self.probe_all()
            .await
            .into_iter()
            .map(|(name, probe)| match probe {
                Ok(connected) => (name, connected),
                Err(error) => {
                    warn!(endpoint = %name, %error, "health probe failed; treating as disconnected");
                    (name, false)
                }
            })
            .collect()
    }

    pub fn provider(&self, name: EndpointName) -> Result<&dyn EndpointProvider, CoreError> {
        self.providers
            .get(&name)
            .map(|provider| provider.as_ref())
            .ok_or(CoreError::EndpointNotConfigured(name))
    }

    pub fn full_node(&self) -> Result<&dyn EndpointProvider, CoreError> {
        self.provider(EndpointName::FullNode)
    }

    pub fn wallet_server(&self) -> Result<&dyn EndpointProvider, CoreError> {
        self.provider(EndpointName::WalletServer)
    }

    /// Configured endpoint names, in configuration order.
    pub fn endpoints(&self) -> impl Iterator<Item = EndpointName> + '_ {
        self.providers.keys().copied()
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.providers
                    .iter()
                    .map(|(name, provider)| (name, provider.base_url())),
            )
            .finish()
    }
}
