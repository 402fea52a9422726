//! Request descriptors and the rules for building them.
//!
//! Everything here is pure: an [`ApiRequest`] is assembled from the client's
//! configuration and the call arguments without touching the network, which
//! keeps URL, header and body placement testable on their own.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::error::{ApiError, ApiResult};
use crate::network::{TOKEN_HEADER, USER_AGENT};

/// Header map: name → value. Names compare case-insensitively on merge.
pub type Headers = HashMap<String, String>;

/// Request parameters after normalization: always a JSON object.
pub type Params = Map<String, Value>;

/// HTTP verb of an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Whether params travel as a JSON body (POST/PUT/PATCH) rather than
    /// in the query string (GET/DELETE).
    pub fn sends_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A fully assembled HTTP request, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute URL including the query string, if any
    pub url: String,
    /// Final header set after all merges
    pub headers: Headers,
    /// JSON body (POST/PUT/PATCH with non-empty params only)
    pub body: Option<String>,
}

impl ApiRequest {
    /// Look up a header by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The query string portion of the URL, without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.url.split_once('?').map(|(_, q)| q)
    }
}

/// Borrowed view of the client configuration a request is built from.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RequestContext<'a> {
    pub endpoint: &'a str,
    pub token: Option<&'a str>,
    pub headers: &'a Headers,
}

impl RequestContext<'_> {
    /// Assemble the request for one call.
    ///
    /// Header precedence, lowest to highest: defaults, `W-Token`, the
    /// client's global headers, then `extra_headers`.
    pub fn build(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        extra_headers: Option<&Headers>,
    ) -> ApiResult<ApiRequest> {
        let mut url = format!("{}/{}", self.endpoint, path.trim_start_matches('/'));
        let mut body = None;

        if !params.is_empty() {
            if method.sends_body() {
                body = Some(serde_json::to_string(params).map_err(ApiError::Serialize)?);
            } else {
                let query = encode_query(params)?;
                if !query.is_empty() {
                    url.push(if url.contains('?') { '&' } else { '?' });
                    url.push_str(&query);
                }
            }
        }

        let mut headers = default_headers();
        if let Some(token) = self.token {
            merge_header(&mut headers, TOKEN_HEADER, token);
        }
        merge_headers(&mut headers, self.headers);
        if let Some(extra) = extra_headers {
            merge_headers(&mut headers, extra);
        }

        Ok(ApiRequest {
            method,
            url,
            headers,
            body,
        })
    }
}

/// Headers sent with every request before any merge.
pub fn default_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers.insert("User-Agent".to_string(), USER_AGENT.to_string());
    headers
}

/// Merge `source` into `target`. Keys from `source` replace any existing key
/// of the same name (ignoring ASCII case); other keys are kept.
pub fn merge_headers(target: &mut Headers, source: &Headers) {
    for (name, value) in source {
        merge_header(target, name, value);
    }
}

fn merge_header(target: &mut Headers, name: &str, value: &str) {
    target.retain(|k, _| !k.eq_ignore_ascii_case(name));
    target.insert(name.to_string(), value.to_string());
}

/// Normalize caller params into a JSON object.
///
/// `()` / `None` / JSON `null` become an empty map. Anything that doesn't
/// serialize to an object is rejected.
pub(crate) fn to_params<P: Serialize + ?Sized>(params: &P) -> ApiResult<Params> {
    match serde_json::to_value(params).map_err(ApiError::Serialize)? {
        Value::Null => Ok(Params::new()),
        Value::Object(map) => Ok(map),
        other => Err(ApiError::InvalidParameter(format!(
            "params must serialize to a JSON object, got {}",
            value_kind(&other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Encode params as a form-urlencoded query string.
///
/// Strings are written verbatim, numbers in their JSON form, booleans as
/// `1`/`0`, and `null` entries are skipped. Arrays and objects are flattened
/// with bracket notation: `ids[0]=1&ids[1]=2`, `filter[status]=active`.
pub fn encode_query(params: &Params) -> ApiResult<String> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        flatten_into(key.clone(), value, &mut pairs);
    }
    serde_urlencoded::to_string(&pairs)
        .map_err(|e| ApiError::InvalidParameter(format!("Failed to encode query string: {}", e)))
}

fn flatten_into(key: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => pairs.push((key, if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => pairs.push((key, n.to_string())),
        Value::String(s) => pairs.push((key, s.clone())),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_into(format!("{}[{}]", key, i), item, pairs);
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                flatten_into(format!("{}[{}]", key, k), v, pairs);
            }
        }
    }
}
