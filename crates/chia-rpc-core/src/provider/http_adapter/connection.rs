use std::collections::BTreeMap;
use std::path::Path;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Identity, Url};

use crate::error::CoreError;

pub(super) fn parse_connection(connection: &str) -> Result<Url, CoreError> {
    let parsed = Url::parse(connection).map_err(|e| {
        CoreError::Configuration(format!(
            "invalid URL `{connection}`: expected HTTP(S) URL ({e})"
        ))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(CoreError::Configuration(format!(
            "unsupported URL scheme `{other}`; expected http or https"
        ))),
    }
}

pub(super) fn build_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap, CoreError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| CoreError::Configuration(format!("invalid header name `{name}`: {e}")))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            CoreError::Configuration(format!("invalid value for header `{name}`: {e}"))
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Load the mutual-TLS client identity from PEM files.
///
/// Certificate and key go together: both or neither.
pub(super) fn load_identity(
    cert_path: Option<&Path>,
    key_path: Option<&Path>,
) -> Result<Option<Identity>, CoreError> {
    let (cert_path, key_path) = match (cert_path, key_path) {
        (Some(cert), Some(key)) => (cert, key),
        (Some(_), None) | (None, Some(_)) => {
            return Err(CoreError::Configuration(
                "client certificate and private key must be set together".to_owned(),
            ));
        }
        (None, None) => return Ok(None),
    };

    let mut pem = read_pem(cert_path, "client certificate")?;
    pem.push(b'\n');
    pem.extend(read_pem(key_path, "private key")?);

    let identity = Identity::from_pem(&pem).map_err(|e| {
        CoreError::Configuration(format!(
            "invalid client identity ({} + {}): {e}",
            cert_path.display(),
            key_path.display()
        ))
    })?;
    Ok(Some(identity))
}

fn read_pem(path: &Path, what: &str) -> Result<Vec<u8>, CoreError> {
    std::fs::read(path).map_err(|e| {
        CoreError::Configuration(format!("failed to read {what} {}: {e}", path.display()))
    })
}
