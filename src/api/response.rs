//! Raw API responses and JSON decoding.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::error::{ApiError, ApiResult};

/// An HTTP response as received: status, headers and body text.
///
/// Kept by the client as the "last response" and returned directly by
/// [`WhenIWorkClient::send`](crate::api::WhenIWorkClient::send).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ApiResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header with the given name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Decode the body as untyped JSON.
    ///
    /// An empty or whitespace-only body decodes to `Value::Null`; anything
    /// else that isn't valid JSON is an [`ApiError::Decode`].
    pub fn json(&self) -> ApiResult<Value> {
        decode_body(&self.body)
    }

    /// Decode the body into a caller-chosen type.
    pub fn json_as<T: DeserializeOwned>(&self) -> ApiResult<T> {
        let value = self.json()?;
        serde_json::from_value(value).map_err(|source| ApiError::Decode {
            source,
            body: self.body.clone(),
        })
    }

    pub(crate) async fn from_reqwest(response: reqwest::Response) -> ApiResult<Self> {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().await?;

        Ok(Self {
            status,
            headers,
            body,
        })
    }
}

pub(crate) fn decode_body(body: &str) -> ApiResult<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|source| {
        tracing::warn!(error = %source, "Response body is not valid JSON");
        ApiError::Decode {
            source,
            body: body.to_string(),
        }
    })
}
