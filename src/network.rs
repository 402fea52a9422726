//! Network constants for the When I Work API.

/// Default REST API base URL (API version 2).
pub const DEFAULT_API_URL: &str = "https://api.wheniwork.com/2";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// `User-Agent` sent with every request: library name and crate version.
pub const USER_AGENT: &str = concat!("WhenIWork-Rust/", env!("CARGO_PKG_VERSION"));

/// Header carrying the user token on authenticated calls.
pub const TOKEN_HEADER: &str = "W-Token";

/// Header carrying the developer key during login.
pub const KEY_HEADER: &str = "W-Key";

/// Path of the login endpoint, relative to the base URL.
pub const LOGIN_PATH: &str = "login";
