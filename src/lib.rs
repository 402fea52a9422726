//! # When I Work Rust client
//!
//! A thin async client for the When I Work scheduling and attendance API.
//! It assembles requests (method, URL, headers, JSON body), attaches the
//! user token, sends each request once, and hands back the decoded JSON.
//!
//! ## Modules
//!
//! - [`api`]: the client, request/response types and errors
//! - [`network`]: base URL, header names and other wire constants
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use serde_json::json;
//! use wheniwork::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let login = WhenIWorkClient::login("developer-key", "me@example.com", "password").await?;
//!
//!     let mut client = WhenIWorkClient::new()?;
//!     client.set_token(login["token"].as_str().unwrap_or_default());
//!
//!     let shifts = client
//!         .get("shifts", &json!({"start": "2023-01-01", "end": "2023-01-07"}), None)
//!         .await?;
//!     println!("{}", shifts);
//!
//!     Ok(())
//! }
//! ```

/// REST API client module.
pub mod api;

/// Network constants (base URL, header names).
pub mod network;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use wheniwork::prelude::*;
/// ```
pub mod prelude {
    pub use crate::api::{
        ApiError, ApiRequest, ApiResponse, ApiResult, ClientConfig, ErrorResponse, Headers,
        Method, WhenIWorkClient, WhenIWorkClientBuilder,
    };

    pub use crate::network::{DEFAULT_API_URL, USER_AGENT};
}
