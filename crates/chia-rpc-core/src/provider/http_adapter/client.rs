use async_trait::async_trait;
use reqwest::{header, Method, Url};
use tracing::{debug, trace};

use crate::error::CoreError;
use crate::types::{HttpVerb, RpcParams, RpcResult};

use super::super::config::EndpointConfig;
use super::super::EndpointProvider;
use super::connection::{build_headers, load_identity, parse_connection};
use super::protocol::{endpoint_url, normalize_response};

/// Chia RPC endpoint over HTTP(S).
///
/// Server certificates are not verified: nodes serve self-signed
/// certificates from their own private CA. When a client certificate and key
/// are configured they are presented for mutual TLS on every connection.
pub struct HttpProvider {
    client: reqwest::Client,
    base_url: Url,
    config: EndpointConfig,
}

impl HttpProvider {
    /// Validate `config` and build the underlying HTTP client.
    ///
    /// Fails with [`CoreError::Configuration`] when the base address is not
    /// an HTTP(S) URL, a header does not form a valid name/value pair, or the
    /// client identity cannot be loaded.
    pub fn new(config: EndpointConfig) -> Result<Self, CoreError> {
        let base_url = parse_connection(&config.base_url)?;
        let headers = build_headers(&config.headers)?;
        let identity = load_identity(config.cert_path.as_deref(), config.key_path.as_deref())?;

        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .default_headers(headers)
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true);
        if !config.timeout.is_zero() {
            builder = builder.timeout(config.timeout);
        }
        if let Some(identity) = identity {
            builder = builder.identity(identity);
        }
        let client = builder
            .build()
            .map_err(|e| CoreError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Provider for `base_url` with default certificate, timeout and headers.
    pub fn from_url(base_url: &str) -> Result<Self, CoreError> {
        Self::new(EndpointConfig::new(base_url))
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("base_url", &self.config.base_url)
            .field("status_page", &self.config.status_page)
            .field("timeout", &self.config.timeout)
            .field("mutual_tls", &self.config.cert_path.is_some())
            .finish()
    }
}

#[async_trait]
impl EndpointProvider for HttpProvider {
    async fn request(
        &self,
        path: &str,
        params: &RpcParams,
        verb: HttpVerb,
    ) -> Result<RpcResult, CoreError> {
        let url = endpoint_url(&self.base_url, path);
        debug!(
            rpc.url = %url,
            rpc.verb = %verb,
            rpc.params = params.len(),
            "rpc request"
        );

        let response = self
            .client
            .request(method_for(verb), &url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(params)
            .send()
            .await
            .map_err(|e| CoreError::transport(&url, e))?;
        let status = response.status();

        let body = response
            .text()
            .await
            .map_err(|e| CoreError::transport(&url, e))?;
        debug!(rpc.url = %url, %status, body_len = body.len(), "rpc response");
        trace!(rpc.url = %url, body = %body, "rpc response body");

        normalize_response(status, &body, &url)
    }

    fn set_status_page(&mut self, path: &str) {
        self.config.status_page = path.to_owned();
    }

    fn status_page(&self) -> &str {
        &self.config.status_page
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

fn method_for(verb: HttpVerb) -> Method {
    match verb {
        HttpVerb::Get => Method::GET,
        HttpVerb::Post => Method::POST,
    }
}
