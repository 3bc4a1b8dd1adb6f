use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::CoreError;
use crate::types::{HttpVerb, RpcParams, RpcResult};

use super::{EndpointProvider, DEFAULT_STATUS_PAGE};

/// One call observed by a [`MockProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub path: String,
    pub params: RpcParams,
    pub verb: HttpVerb,
}

/// Shared handle to the calls a mock received, kept by tests after the mock
/// has been moved into a manager.
pub type CallLog = Arc<Mutex<Vec<RecordedCall>>>;

#[derive(Debug, Clone)]
enum MockReply {
    Result(RpcResult),
    NotFound,
    TransportFailure(String),
}

/// A mock endpoint for testing. Returns canned replies per path, populated
/// via the builder pattern. Unknown paths answer with an empty map, the same
/// shape an unparsable body normalizes to.
pub struct MockProvider {
    base_url: String,
    status_page: String,
    replies: HashMap<String, MockReply>,
    calls: CallLog,
}

impl MockProvider {
    pub fn builder(base_url: &str) -> MockProviderBuilder {
        MockProviderBuilder {
            base_url: base_url.to_owned(),
            replies: HashMap::new(),
        }
    }

    pub fn calls(&self) -> CallLog {
        Arc::clone(&self.calls)
    }
}

pub struct MockProviderBuilder {
    base_url: String,
    replies: HashMap<String, MockReply>,
}

impl MockProviderBuilder {
    /// Answer `path` with `value`, which must be a JSON object.
    pub fn with_result(mut self, path: &str, value: serde_json::Value) -> Self {
        let map = match value {
            serde_json::Value::Object(map) => map,
            other => panic!("mock result for {path} must be a JSON object, got {other}"),
        };
        self.replies.insert(path.to_owned(), MockReply::Result(map));
        self
    }

    pub fn with_not_found(mut self, path: &str) -> Self {
        self.replies.insert(path.to_owned(), MockReply::NotFound);
        self
    }

    pub fn with_transport_failure(mut self, path: &str, message: &str) -> Self {
        self.replies.insert(
            path.to_owned(),
            MockReply::TransportFailure(message.to_owned()),
        );
        self
    }

    pub fn build(self) -> MockProvider {
        MockProvider {
            base_url: self.base_url,
            status_page: DEFAULT_STATUS_PAGE.to_owned(),
            replies: self.replies,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl EndpointProvider for MockProvider {
    async fn request(
        &self,
        path: &str,
        params: &RpcParams,
        verb: HttpVerb,
    ) -> Result<RpcResult, CoreError> {
        self.calls.lock().unwrap().push(RecordedCall {
            path: path.to_owned(),
            params: params.clone(),
            verb,
        });

        let url = format!("{}/{}", self.base_url, path);
        match self.replies.get(path) {
            Some(MockReply::Result(map)) => Ok(map.clone()),
            Some(MockReply::NotFound) => Err(CoreError::NotFound { url }),
            Some(MockReply::TransportFailure(message)) => Err(CoreError::transport(
                &url,
                io::Error::new(io::ErrorKind::ConnectionRefused, message.clone()),
            )),
            None => Ok(RpcResult::new()),
        }
    }

    fn set_status_page(&mut self, path: &str) {
        self.status_page = path.to_owned();
    }

    fn status_page(&self) -> &str {
        &self.status_page
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_and_answers_canned_results() {
        let mock = MockProvider::builder("https://mock:8555")
            .with_result("get_blockchain_state", serde_json::json!({"success": true}))
            .build();
        let calls = mock.calls();

        let result = mock
            .request("get_blockchain_state", &RpcParams::new(), HttpVerb::Post)
            .await
            .unwrap();
        assert_eq!(result["success"], true);

        let unknown = mock
            .request("anything_else", &RpcParams::new(), HttpVerb::Get)
            .await
            .unwrap();
        assert!(unknown.is_empty());

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].path, "get_blockchain_state");
        assert_eq!(calls[1].verb, HttpVerb::Get);
    }

    #[tokio::test]
    async fn transport_failure_surfaces_as_error() {
        let mock = MockProvider::builder("https://mock:9256")
            .with_transport_failure("get_sync_status", "connection refused")
            .build();
        let err = mock
            .request("get_sync_status", &RpcParams::new(), HttpVerb::Get)
            .await
            .expect_err("must fail");
        assert!(matches!(err, CoreError::Transport { .. }));
        assert!(err.to_string().contains("connection refused"));
    }
}
