//! Endpoint provider abstraction.
//!
//! Defines the [`EndpointProvider`] trait and provides an HTTPS implementation
//! ([`HttpProvider`]) plus a test double (`mock::MockProvider`).

mod config;
mod http_adapter;
#[cfg(test)]
pub mod mock;

pub use config::{timeout_from_secs_f64, EndpointConfig, DEFAULT_STATUS_PAGE, DEFAULT_TIMEOUT};
pub use http_adapter::HttpProvider;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::types::{HttpVerb, RpcParams, RpcResult};

/// One node endpoint that can perform raw request/response exchanges.
///
/// Implementations own their connection configuration and are expected to
/// normalize response bodies the same way [`HttpProvider`] does, so the
/// manager and facade never see transport-specific shapes.
#[async_trait]
pub trait EndpointProvider: Send + Sync {
    /// Send `params` as a JSON body to `path` relative to the endpoint's
    /// base address.
    async fn request(
        &self,
        path: &str,
        params: &RpcParams,
        verb: HttpVerb,
    ) -> Result<RpcResult, CoreError>;

    /// Like [`request`](Self::request), but takes the verb as text. Anything
    /// other than GET/POST fails before any network activity.
    async fn request_as(
        &self,
        path: &str,
        params: &RpcParams,
        verb: &str,
    ) -> Result<RpcResult, CoreError> {
        let verb: HttpVerb = verb.parse()?;
        self.request(path, params, verb).await
    }

    /// Probe the health-check path. An endpoint is live when the normalized
    /// body carries a `blockID` or `status` key, whatever its value.
    ///
    /// Request failures are returned, not swallowed.
    async fn is_connected(&self) -> Result<bool, CoreError> {
        let status = self
            .request(self.status_page(), &RpcParams::new(), HttpVerb::default())
            .await?;
        Ok(status.contains_key("blockID") || status.contains_key("status"))
    }

    /// Replace the health-check path.
    fn set_status_page(&mut self, path: &str);

    fn status_page(&self) -> &str;

    fn base_url(&self) -> &str;
}
