//! API error types for the When I Work client.

use std::fmt;

use thiserror::Error;

/// Error type for every client operation.
///
/// Status variants (`Unauthorized` through `UnexpectedStatus`) are only
/// produced when the client was configured with `error_for_status(true)`.
/// By default a non-2xx response is decoded and returned like any other body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure from reqwest (DNS, refused connection, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON
    #[error("Failed to decode response body: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        /// Raw body text as received
        body: String,
    },

    /// Request parameters could not be serialized to JSON
    #[error("Failed to serialize request parameters: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Invalid parameter provided (params shape, header name/value, URL)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Missing or invalid token (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(ErrorResponse),

    /// Permission denied (403)
    #[error("Forbidden: {0}")]
    Forbidden(ErrorResponse),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(ErrorResponse),

    /// Invalid request parameters (400)
    #[error("Bad request: {0}")]
    BadRequest(ErrorResponse),

    /// Resource already exists or was modified concurrently (409)
    #[error("Conflict: {0}")]
    Conflict(ErrorResponse),

    /// Too many requests (429)
    #[error("Rate limited: {0}")]
    RateLimited(ErrorResponse),

    /// Server-side error (5xx)
    #[error("Server error {0}: {1}")]
    ServerError(u16, ErrorResponse),

    /// Any other non-2xx status
    #[error("Unexpected status {0}: {1}")]
    UnexpectedStatus(u16, ErrorResponse),
}

impl ApiError {
    /// HTTP status carried by the error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::BadRequest(_) => Some(400),
            ApiError::Conflict(_) => Some(409),
            ApiError::RateLimited(_) => Some(429),
            ApiError::ServerError(status, _) | ApiError::UnexpectedStatus(status, _) => {
                Some(*status)
            }
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the failure happened before any response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Http(_))
    }

    /// Whether the failure was the configured request timeout expiring.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Http(e) if e.is_timeout())
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error payload format returned by the API.
///
/// The API reports failures as `{"error": "...", "code": 1234}`. Bodies that
/// don't follow that shape are kept verbatim in `message`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    #[serde(alias = "error")]
    pub message: Option<String>,
    /// Numeric API error code
    #[serde(default)]
    pub code: Option<i64>,
}

impl ErrorResponse {
    /// Parse an error body, falling back to the raw text.
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .filter(|e| e.message.is_some() || e.code.is_some())
            .unwrap_or_else(|| Self::from_text(body.to_string()))
    }

    /// Wrap plain text as an error response.
    pub fn from_text(text: String) -> Self {
        Self {
            message: if text.is_empty() { None } else { Some(text) },
            code: None,
        }
    }

    /// Get the error message, or a placeholder when the server sent none.
    pub fn get_message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {})", self.get_message(), code),
            None => write!(f, "{}", self.get_message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_from_api_payload() {
        let err = ErrorResponse::from_body(r#"{"error":"User not found","code":1001}"#);
        assert_eq!(err.message.as_deref(), Some("User not found"));
        assert_eq!(err.code, Some(1001));
        assert_eq!(err.to_string(), "User not found (code 1001)");
    }

    #[test]
    fn test_error_response_message_key() {
        let err = ErrorResponse::from_body(r#"{"message":"Bad shift"}"#);
        assert_eq!(err.get_message(), "Bad shift");
        assert_eq!(err.to_string(), "Bad shift");
    }

    #[test]
    fn test_error_response_falls_back_to_text() {
        let err = ErrorResponse::from_body("<html>502 Bad Gateway</html>");
        assert_eq!(err.message.as_deref(), Some("<html>502 Bad Gateway</html>"));
        assert_eq!(err.code, None);

        // Valid JSON without any known field is kept verbatim too.
        let err = ErrorResponse::from_body(r#"{"users":[]}"#);
        assert_eq!(err.message.as_deref(), Some(r#"{"users":[]}"#));
    }

    #[test]
    fn test_error_response_empty_body() {
        let err = ErrorResponse::from_body("");
        assert_eq!(err.message, None);
        assert_eq!(err.get_message(), "Unknown error");
    }

    #[test]
    fn test_status_of_status_variants() {
        let payload = ErrorResponse::from_text("nope".to_string());
        assert_eq!(ApiError::NotFound(payload.clone()).status(), Some(404));
        assert_eq!(ApiError::ServerError(503, payload.clone()).status(), Some(503));
        assert_eq!(ApiError::UnexpectedStatus(418, payload).status(), Some(418));
        assert_eq!(ApiError::InvalidParameter("x".to_string()).status(), None);
    }

    #[test]
    fn test_decode_error_keeps_body() {
        let source = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
        let err = ApiError::Decode {
            source,
            body: "{invalid".to_string(),
        };
        assert!(err.to_string().starts_with("Failed to decode response body"));
        assert!(!err.is_transport());
        match err {
            ApiError::Decode { body, .. } => assert_eq!(body, "{invalid"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
