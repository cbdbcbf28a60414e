//! Shared User-Agent header profile for index and asset requests.
//!
//! The catalog serves its gallery markup only to browser-like clients, so
//! every request carries a desktop browser User-Agent.

/// Desktop browser User-Agent attached to every request by default.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36 Edg/116.0.1938.76";

/// Returns the default User-Agent for catalog requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}
