use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;

use crate::error::TransportError;

use super::request::OutgoingRequest;
use super::response::HttpResponse;

/// Sends one request and hands back status and body.
///
/// Implementations must honour `request.timeout`; the executor also bounds
/// every call with the same timeout.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutgoingRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport;

impl ReqwestTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<HttpResponse, TransportError> {
        let headers = build_headers(&request.headers)?;
        let seconds = request.timeout.as_secs();

        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(request.timeout)
            .build()
            .map_err(|err| TransportError::Failed(format!("Failed to build HTTP client: {err}")))?;

        let mut builder = client
            .request(request.method.into(), &request.url)
            .headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|err| map_error(err, seconds))?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|err| map_error(err, seconds))?;

        Ok(HttpResponse {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

fn map_error(err: reqwest::Error, seconds: u64) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout { seconds }
    } else {
        TransportError::Failed(err.to_string())
    }
}

pub fn build_headers(input: &[(String, String)]) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::new();

    for (key, value) in input {
        if key.is_empty() {
            continue;
        }

        let header_name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|err| TransportError::Failed(format!("Invalid header name `{key}`: {err}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|err| TransportError::Failed(format!("Invalid header value for `{key}`: {err}")))?;
        headers.append(header_name, header_value);
    }

    Ok(headers)
}
