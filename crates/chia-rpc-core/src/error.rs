use crate::types::EndpointName;

/// Boxed cause carried by [`CoreError::Transport`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid endpoint configuration: {0}")]
    Configuration(String),

    #[error("unsupported HTTP method `{0}`; expected GET or POST")]
    UnsupportedMethod(String),

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("transport failure calling {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("endpoint `{0}` is not configured")]
    EndpointNotConfigured(EndpointName),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("address codec failure: {0}")]
    Codec(String),

    #[error("invalid block identifier `{0}`; expected `latest`, a height, or a 0x-prefixed header hash")]
    InvalidBlockId(String),

    #[error("unexpected `{method}` response: {message}")]
    InvalidResponse { method: String, message: String },
}

impl CoreError {
    pub(crate) fn transport(url: &str, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            url: url.to_owned(),
            source: source.into(),
        }
    }

    pub(crate) fn invalid_response(method: &str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            method: method.to_owned(),
            message: message.into(),
        }
    }
}
