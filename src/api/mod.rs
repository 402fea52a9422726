//! REST API client module for When I Work.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use serde_json::json;
//! use wheniwork::api::WhenIWorkClient;
//!
//! let client = WhenIWorkClient::with_token("abc123")?;
//!
//! // GET /2/users?status=active
//! let users = client.get("users", &json!({"status": "active"}), None).await?;
//!
//! // POST /2/shifts with a JSON body
//! let shift = client
//!     .create("shifts", &json!({"start_time": "2023-01-01 09:00", "end_time": "2023-01-01 17:00"}), None)
//!     .await?;
//!
//! // Status, headers and body of the call that just completed
//! let raw = client.last_response().await;
//! ```
//!
//! # Client Configuration
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use wheniwork::api::WhenIWorkClient;
//!
//! let client = WhenIWorkClient::builder()
//!     .token("abc123")
//!     .header("W-UserId", "12")
//!     .timeout(Duration::from_secs(30))
//!     .build()?;
//! ```
//!
//! # Error Handling
//!
//! All methods return `ApiResult<T>`, an alias for `Result<T, ApiError>`.
//! By default a non-2xx response is not an error: the decoded error payload
//! is returned and the status is available from
//! [`last_response`](WhenIWorkClient::last_response). Enable
//! `error_for_status(true)` to get typed status errors instead:
//!
//! ```rust,ignore
//! use wheniwork::api::{ApiError, WhenIWorkClient};
//!
//! let client = WhenIWorkClient::builder().token(token).error_for_status(true).build()?;
//! match client.get("users/999", &(), None).await {
//!     Ok(user) => println!("{}", user),
//!     Err(ApiError::NotFound(e)) => println!("No such user: {}", e),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```

pub mod client;
pub mod error;
pub mod request;
pub mod response;

// Re-export main types for convenience
pub use client::{ClientConfig, WhenIWorkClient, WhenIWorkClientBuilder};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use request::{ApiRequest, Headers, Method, Params};
pub use response::ApiResponse;
