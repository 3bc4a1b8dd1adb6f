use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;

/// Per-request timeout used when the caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Health-check path used until the manager assigns the endpoint's own.
pub const DEFAULT_STATUS_PAGE: &str = "/";

// ==============================================================================
// Endpoint Configuration
// ==============================================================================

/// Connection parameters for a single endpoint.
///
/// The config is validated and frozen when handed to
/// [`HttpProvider::new`](super::HttpProvider::new); only the health-check
/// path can change afterwards, through the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointConfig {
    pub base_url: String,
    /// PEM client certificate presented for mutual TLS.
    pub cert_path: Option<PathBuf>,
    /// PEM private key matching `cert_path`.
    pub key_path: Option<PathBuf>,
    /// Zero disables the per-request timeout.
    pub timeout: Duration,
    pub headers: BTreeMap<String, String>,
    pub status_page: String,
}

impl EndpointConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            cert_path: None,
            key_path: None,
            timeout: DEFAULT_TIMEOUT,
            headers: BTreeMap::new(),
            status_page: DEFAULT_STATUS_PAGE.to_owned(),
        }
    }

    pub fn with_client_identity(
        mut self,
        cert_path: impl Into<PathBuf>,
        key_path: impl Into<PathBuf>,
    ) -> Self {
        self.cert_path = Some(cert_path.into());
        self.key_path = Some(key_path.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_status_page(mut self, path: impl Into<String>) -> Self {
        self.status_page = path.into();
        self
    }
}

/// Convert a timeout given in (possibly fractional) seconds.
///
/// Negative, NaN and infinite values are configuration errors.
pub fn timeout_from_secs_f64(secs: f64) -> Result<Duration, CoreError> {
    Duration::try_from_secs_f64(secs)
        .map_err(|e| CoreError::Configuration(format!("invalid timeout duration `{secs}`: {e}")))
}
