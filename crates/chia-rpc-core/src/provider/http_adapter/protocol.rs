use reqwest::{StatusCode, Url};

use crate::error::CoreError;
use crate::types::RpcResult;

/// Body some health-check pages return instead of JSON.
const LITERAL_OK: &str = "OK";

/// Join the endpoint base address and a method path with exactly one `/`.
pub(super) fn endpoint_url(base: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Normalize a raw HTTP response into an [`RpcResult`].
///
/// - 404 fails with `NotFound` whatever the body says;
/// - a bare `OK` body becomes `{"status": 1}`;
/// - a body that is not a JSON object becomes `{}`;
/// - any other JSON object passes through untouched.
///
/// Other non-success statuses are not errors; callers inspect the map.
pub(super) fn normalize_response(
    status: StatusCode,
    body: &str,
    url: &str,
) -> Result<RpcResult, CoreError> {
    if status == StatusCode::NOT_FOUND {
        return Err(CoreError::NotFound {
            url: url.to_owned(),
        });
    }

    if body == LITERAL_OK {
        let mut ok = RpcResult::new();
        ok.insert("status".to_owned(), serde_json::json!(1));
        return Ok(ok);
    }

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        _ => Ok(RpcResult::new()),
    }
}
