//! Constants for the fetch module (timeouts).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default timeout for index page requests (60 seconds).
pub const INDEX_TIMEOUT_SECS: u64 = 60;

/// Default timeout for thumbnail requests (30 seconds).
pub const IMAGE_TIMEOUT_SECS: u64 = 30;
