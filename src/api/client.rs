//! When I Work REST API client implementation.
//!
//! The [`WhenIWorkClient`] holds connection configuration (endpoint, token,
//! global headers, timeout) and funnels every call through a single dispatch
//! routine: build the request, send it once, record the response, decode the
//! body as JSON.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use wheniwork::api::WhenIWorkClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let login = WhenIWorkClient::login("dev-key", "me@example.com", "hunter2").await?;
//!     let token = login["token"].as_str().unwrap_or_default();
//!
//!     let client = WhenIWorkClient::with_token(token)?;
//!     let users = client.get("users", &json!({"status": "active"}), None).await?;
//!     println!("{}", users);
//!
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::api::request::{merge_headers, to_params, ApiRequest, Headers, Method, RequestContext};
use crate::api::response::ApiResponse;
use crate::network::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, KEY_HEADER, LOGIN_PATH};

/// Library-level configuration surface. Every field is optional.
///
/// Derives `Deserialize` so it can be loaded from whatever format the
/// application keeps its settings in.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub token: Option<String>,
    pub endpoint: Option<String>,
    pub headers: Option<Headers>,
    /// Request timeout in seconds
    pub timeout: Option<u64>,
}

/// Builder for configuring [`WhenIWorkClient`].
#[derive(Debug, Clone)]
pub struct WhenIWorkClientBuilder {
    endpoint: String,
    token: Option<String>,
    headers: Headers,
    timeout: Duration,
    error_for_status: bool,
}

impl Default for WhenIWorkClientBuilder {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_API_URL.to_string(),
            token: None,
            headers: Headers::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            error_for_status: false,
        }
    }
}

impl WhenIWorkClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the user token sent as `W-Token`.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Override the base URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Add a global header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut single = Headers::new();
        single.insert(name.into(), value.into());
        merge_headers(&mut self.headers, &single);
        self
    }

    /// Merge a set of global headers.
    pub fn headers(mut self, headers: Headers) -> Self {
        merge_headers(&mut self.headers, &headers);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Turn non-2xx responses into typed [`ApiError`]s instead of returning
    /// the decoded error payload. Off by default.
    pub fn error_for_status(mut self, enabled: bool) -> Self {
        self.error_for_status = enabled;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if a global header is not a valid HTTP header or the
    /// HTTP client cannot be initialized.
    pub fn build(self) -> ApiResult<WhenIWorkClient> {
        to_header_map(&self.headers)?;

        let http_client = Client::builder().pool_max_idle_per_host(10).build()?;

        Ok(WhenIWorkClient {
            http_client,
            endpoint: self.endpoint,
            token: self.token,
            headers: self.headers,
            timeout: self.timeout,
            error_for_status: self.error_for_status,
            last_response: Arc::new(RwLock::new(None)),
        })
    }
}

/// When I Work REST API client.
///
/// Configuration is changed through `&mut self` setters, which chain:
///
/// ```rust,ignore
/// client
///     .set_token("abc123")
///     .set_headers(headers, false)
///     .set_timeout(Duration::from_secs(30));
/// ```
///
/// Each call builds its request from the configuration as it is at call
/// time. Clones share the last-response slot.
#[derive(Clone)]
pub struct WhenIWorkClient {
    http_client: Client,
    endpoint: String,
    token: Option<String>,
    headers: Headers,
    timeout: Duration,
    error_for_status: bool,
    last_response: Arc<RwLock<Option<ApiResponse>>>,
}

impl fmt::Debug for WhenIWorkClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhenIWorkClient")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("timeout", &self.timeout)
            .field("error_for_status", &self.error_for_status)
            .finish()
    }
}

impl WhenIWorkClient {
    /// Create a client with default settings (no token, default endpoint,
    /// 10s timeout).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new() -> ApiResult<Self> {
        WhenIWorkClientBuilder::new().build()
    }

    /// Create a client that authenticates with `token`.
    pub fn with_token(token: impl Into<String>) -> ApiResult<Self> {
        WhenIWorkClientBuilder::new().token(token).build()
    }

    /// Create a new client builder for custom configuration.
    pub fn builder() -> WhenIWorkClientBuilder {
        WhenIWorkClientBuilder::new()
    }

    /// Create a client from a [`ClientConfig`], defaulting absent fields.
    pub fn from_config(config: ClientConfig) -> ApiResult<Self> {
        let mut builder = WhenIWorkClientBuilder::new();
        if let Some(token) = config.token {
            builder = builder.token(token);
        }
        if let Some(endpoint) = config.endpoint {
            builder = builder.endpoint(endpoint);
        }
        if let Some(headers) = config.headers {
            builder = builder.headers(headers);
        }
        if let Some(secs) = config.timeout {
            builder = builder.timeout_secs(secs);
        }
        builder.build()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub fn set_token(&mut self, token: impl Into<String>) -> &mut Self {
        self.token = Some(token.into());
        self
    }

    pub fn clear_token(&mut self) -> &mut Self {
        self.token = None;
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Override the base URL for all subsequent requests.
    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) -> &mut Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Update the global headers.
    ///
    /// With `reset` the header map is replaced by `headers`. Otherwise
    /// `headers` is merged in: its keys override existing keys of the same
    /// name and every other existing key is kept.
    pub fn set_headers(&mut self, headers: Headers, reset: bool) -> &mut Self {
        if reset {
            self.headers = headers;
        } else {
            merge_headers(&mut self.headers, &headers);
        }
        self
    }

    /// Current global headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// See [`WhenIWorkClientBuilder::error_for_status`].
    pub fn set_error_for_status(&mut self, enabled: bool) -> &mut Self {
        self.error_for_status = enabled;
        self
    }

    pub fn error_for_status(&self) -> bool {
        self.error_for_status
    }

    /// The most recent raw response received by this client (or any clone
    /// of it), if a request has completed yet.
    pub async fn last_response(&self) -> Option<ApiResponse> {
        self.last_response.read().await.clone()
    }

    // =========================================================================
    // Verb methods
    // =========================================================================

    /// `GET {endpoint}/{path}`; params go to the query string.
    pub async fn get<P: Serialize + ?Sized>(
        &self,
        path: &str,
        params: &P,
        headers: Option<&Headers>,
    ) -> ApiResult<Value> {
        self.request(Method::Get, path, params, headers).await
    }

    /// `POST {endpoint}/{path}`; params go to the JSON body.
    pub async fn post<P: Serialize + ?Sized>(
        &self,
        path: &str,
        params: &P,
        headers: Option<&Headers>,
    ) -> ApiResult<Value> {
        self.request(Method::Post, path, params, headers).await
    }

    /// Alias for [`post`](Self::post).
    pub async fn create<P: Serialize + ?Sized>(
        &self,
        path: &str,
        params: &P,
        headers: Option<&Headers>,
    ) -> ApiResult<Value> {
        self.request(Method::Post, path, params, headers).await
    }

    /// `PUT {endpoint}/{path}`; params go to the JSON body.
    pub async fn update<P: Serialize + ?Sized>(
        &self,
        path: &str,
        params: &P,
        headers: Option<&Headers>,
    ) -> ApiResult<Value> {
        self.request(Method::Put, path, params, headers).await
    }

    /// `PATCH {endpoint}/{path}`; params go to the JSON body.
    pub async fn patch<P: Serialize + ?Sized>(
        &self,
        path: &str,
        params: &P,
        headers: Option<&Headers>,
    ) -> ApiResult<Value> {
        self.request(Method::Patch, path, params, headers).await
    }

    /// `DELETE {endpoint}/{path}`; params go to the query string.
    pub async fn delete<P: Serialize + ?Sized>(
        &self,
        path: &str,
        params: &P,
        headers: Option<&Headers>,
    ) -> ApiResult<Value> {
        self.request(Method::Delete, path, params, headers).await
    }

    /// Dispatch one call and decode the response body.
    ///
    /// Non-2xx responses are decoded and returned like any other unless
    /// `error_for_status` is enabled.
    pub async fn request<P: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        params: &P,
        headers: Option<&Headers>,
    ) -> ApiResult<Value> {
        let request = self.build_request(method, path, params, headers)?;
        let response = self.send(request).await?;

        if self.error_for_status && !response.is_success() {
            return Err(map_status_error(
                response.status,
                ErrorResponse::from_body(&response.body),
            ));
        }

        response.json()
    }

    /// Build the request a call would send, without sending it.
    pub fn build_request<P: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        params: &P,
        headers: Option<&Headers>,
    ) -> ApiResult<ApiRequest> {
        let params = to_params(params)?;
        RequestContext {
            endpoint: &self.endpoint,
            token: self.token.as_deref(),
            headers: &self.headers,
        }
        .build(method, path, &params, headers)
    }

    /// Send a prepared request exactly once and return the raw response.
    ///
    /// The response is also stored as the client's last response.
    pub async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let url = Url::parse(&request.url)
            .map_err(|e| ApiError::InvalidParameter(format!("Invalid URL '{}': {}", request.url, e)))?;
        let header_map = to_header_map(&request.headers)?;

        let mut builder = self
            .http_client
            .request(request.method.into(), url)
            .headers(header_map)
            .timeout(self.timeout);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        tracing::debug!(method = %request.method, url = %request.url, "Sending request");

        let response = builder.send().await.map_err(|e| {
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                timeout = e.is_timeout(),
                error = %e,
                "Request failed"
            );
            ApiError::Http(e)
        })?;
        let response = ApiResponse::from_reqwest(response).await?;

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status = response.status,
            "Received response"
        );

        *self.last_response.write().await = Some(response.clone());
        Ok(response)
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Log in against the default endpoint.
    ///
    /// Sends `POST {endpoint}/login` with the developer key as `W-Key` and
    /// returns the server's login payload. The token in that payload is not
    /// stored anywhere; pass it to [`set_token`](Self::set_token) or
    /// [`with_token`](Self::with_token).
    pub async fn login(key: &str, email: &str, password: &str) -> ApiResult<Value> {
        Self::login_with_endpoint(DEFAULT_API_URL, key, email, password).await
    }

    /// Same as [`login`](Self::login) against a different base URL.
    pub async fn login_with_endpoint(
        endpoint: &str,
        key: &str,
        email: &str,
        password: &str,
    ) -> ApiResult<Value> {
        let client = Self::builder().endpoint(endpoint).build()?;

        let mut headers = Headers::new();
        headers.insert(KEY_HEADER.to_string(), key.to_string());

        tracing::debug!(endpoint = %client.endpoint, "Logging in");

        client
            .post(
                LOGIN_PATH,
                &LoginRequest {
                    username: email,
                    password,
                },
                Some(&headers),
            )
            .await
    }
}

/// Request body for the login endpoint
#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

fn to_header_map(headers: &Headers) -> ApiResult<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::try_from(name.as_str())
            .map_err(|e| ApiError::InvalidParameter(format!("Invalid header name '{}': {}", name, e)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::InvalidParameter(format!("Invalid header value for '{}': {}", name, e)))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Map HTTP status code to ApiError.
fn map_status_error(status: u16, response: ErrorResponse) -> ApiError {
    match StatusCode::from_u16(status) {
        Ok(StatusCode::UNAUTHORIZED) => ApiError::Unauthorized(response),
        Ok(StatusCode::FORBIDDEN) => ApiError::Forbidden(response),
        Ok(StatusCode::NOT_FOUND) => ApiError::NotFound(response),
        Ok(StatusCode::BAD_REQUEST) => ApiError::BadRequest(response),
        Ok(StatusCode::CONFLICT) => ApiError::Conflict(response),
        Ok(StatusCode::TOO_MANY_REQUESTS) => ApiError::RateLimited(response),
        Ok(s) if s.is_server_error() => ApiError::ServerError(status, response),
        _ => ApiError::UnexpectedStatus(status, response),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_client_defaults() {
        let client = WhenIWorkClient::new().unwrap();
        assert_eq!(client.endpoint(), "https://api.wheniwork.com/2");
        assert_eq!(client.token(), None);
        assert!(client.headers().is_empty());
        assert_eq!(client.timeout(), Duration::from_secs(10));
        assert!(!client.error_for_status());
    }

    #[test]
    fn test_client_builder() {
        let client = WhenIWorkClient::builder()
            .endpoint("http://localhost:8080/2/")
            .token("abc123")
            .header("X-Custom", "test")
            .timeout_secs(60)
            .error_for_status(true)
            .build()
            .unwrap();

        // Trailing slash removed
        assert_eq!(client.endpoint(), "http://localhost:8080/2");
        assert_eq!(client.token(), Some("abc123"));
        assert_eq!(client.headers(), &headers(&[("X-Custom", "test")]));
        assert_eq!(client.timeout(), Duration::from_secs(60));
        assert!(client.error_for_status());
    }

    #[test]
    fn test_builder_rejects_invalid_header() {
        let err = WhenIWorkClient::builder()
            .header("Bad Header", "x")
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameter(_)));
    }

    #[test]
    fn test_setters_chain() {
        let mut client = WhenIWorkClient::new().unwrap();
        client
            .set_token("abc123")
            .set_endpoint("https://example.test/2/")
            .set_headers(headers(&[("W-UserId", "9")]), false)
            .set_timeout(Duration::from_secs(3));

        assert_eq!(client.token(), Some("abc123"));
        assert_eq!(client.endpoint(), "https://example.test/2");
        assert_eq!(client.headers().get("W-UserId").map(String::as_str), Some("9"));
        assert_eq!(client.timeout(), Duration::from_secs(3));

        client.clear_token();
        assert_eq!(client.token(), None);
    }

    #[test]
    fn test_set_headers_merge() {
        let mut client = WhenIWorkClient::new().unwrap();
        client.set_headers(headers(&[("A", "1"), ("B", "2")]), false);
        client.set_headers(headers(&[("B", "3"), ("C", "4")]), false);
        assert_eq!(client.headers(), &headers(&[("A", "1"), ("B", "3"), ("C", "4")]));
    }

    #[test]
    fn test_set_headers_reset() {
        let mut client = WhenIWorkClient::new().unwrap();
        client.set_headers(headers(&[("A", "1"), ("B", "2")]), false);
        client.set_headers(headers(&[("C", "4")]), true);
        assert_eq!(client.headers(), &headers(&[("C", "4")]));

        client.set_headers(Headers::new(), true);
        assert!(client.headers().is_empty());
    }

    #[test]
    fn test_build_request_uses_current_config() {
        let mut client = WhenIWorkClient::with_token("abc123").unwrap();
        let req = client
            .build_request(Method::Get, "users", &json!({"status": "active"}), None)
            .unwrap();
        assert_eq!(req.url, "https://api.wheniwork.com/2/users?status=active");
        assert_eq!(req.header("W-Token"), Some("abc123"));
        assert!(req.body.is_none());

        client
            .set_token("other")
            .set_endpoint("http://localhost:9000/2")
            .set_headers(headers(&[("X-Trace", "1")]), false);
        let req = client.build_request(Method::Put, "users/1", &(), None).unwrap();
        assert_eq!(req.url, "http://localhost:9000/2/users/1");
        assert_eq!(req.header("W-Token"), Some("other"));
        assert_eq!(req.header("X-Trace"), Some("1"));
        assert!(req.body.is_none());
    }

    #[test]
    fn test_build_request_rejects_scalar_params() {
        let client = WhenIWorkClient::new().unwrap();
        let err = client
            .build_request(Method::Post, "shifts", &"not an object", None)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameter(_)));
    }

    #[test]
    fn test_from_config() {
        let config: ClientConfig = serde_json::from_value(json!({
            "token": "abc123",
            "endpoint": "https://staging.example.test/2",
            "headers": {"W-UserId": "12"},
            "timeout": 30
        }))
        .unwrap();
        let client = WhenIWorkClient::from_config(config).unwrap();
        assert_eq!(client.token(), Some("abc123"));
        assert_eq!(client.endpoint(), "https://staging.example.test/2");
        assert_eq!(client.headers(), &headers(&[("W-UserId", "12")]));
        assert_eq!(client.timeout(), Duration::from_secs(30));

        let empty: ClientConfig = serde_json::from_str("{}").unwrap();
        let client = WhenIWorkClient::from_config(empty).unwrap();
        assert_eq!(client.endpoint(), DEFAULT_API_URL);
        assert_eq!(client.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = WhenIWorkClient::with_token("super-secret").unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_map_status_error() {
        let payload = ErrorResponse::from_text("x".to_string());
        assert!(matches!(map_status_error(401, payload.clone()), ApiError::Unauthorized(_)));
        assert!(matches!(map_status_error(403, payload.clone()), ApiError::Forbidden(_)));
        assert!(matches!(map_status_error(404, payload.clone()), ApiError::NotFound(_)));
        assert!(matches!(map_status_error(400, payload.clone()), ApiError::BadRequest(_)));
        assert!(matches!(map_status_error(409, payload.clone()), ApiError::Conflict(_)));
        assert!(matches!(map_status_error(429, payload.clone()), ApiError::RateLimited(_)));
        assert!(matches!(map_status_error(502, payload.clone()), ApiError::ServerError(502, _)));
        assert!(matches!(map_status_error(418, payload), ApiError::UnexpectedStatus(418, _)));
    }

    #[tokio::test]
    async fn test_no_last_response_before_first_call() {
        let client = WhenIWorkClient::new().unwrap();
        assert!(client.last_response().await.is_none());
    }
}
