//! HTTP access for index pages and asset thumbnails.
//!
//! A single [`HttpClient`] is shared by every concurrent caller of a run.
//! Failures are reported as [`FetchError`] and are never fatal to a run:
//! callers log them and drop the page or asset.

mod client;
pub mod constants;
mod error;

pub use client::{FetchedPage, HttpClient};
pub use error::FetchError;
