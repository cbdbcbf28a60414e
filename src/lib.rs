//! iStock Miner Library
//!
//! Crawls the search index of an image catalog for a phrase, extracts the
//! thumbnail URLs of every result page and downloads the images that are
//! not already present in the local dataset directory.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`query`] - Search criteria normalization and index page URLs
//! - [`fetch`] - Shared HTTP client for pages and thumbnails
//! - [`extract`] - Gallery markup extraction
//! - [`identity`] - Asset identities and the on-disk identity cache
//! - [`queue`] - Work queue with an explicit completion signal
//! - [`pipeline`] - Index fetch stage and download worker pool
//! - [`miner`] - Run orchestration and similarity mode

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod extract;
pub mod fetch;
pub mod identity;
pub mod layout;
pub mod miner;
pub mod pipeline;
pub mod query;
pub mod queue;
mod user_agent;

// Re-export commonly used types
pub use config::MinerConfig;
pub use fetch::{FetchError, HttpClient};
pub use identity::{IdentityCache, asset_identity};
pub use layout::DatasetLayout;
pub use miner::{Miner, MinerError, MiningReport, SimilarityProbe};
pub use pipeline::{DEFAULT_CONCURRENCY, MAX_CONCURRENCY, MiningStats};
pub use query::{MediaType, Orientation, PeopleCount, SearchCriteria, SimilarityKind};
pub use queue::{DownloadJob, WorkQueue};
pub use user_agent::BROWSER_USER_AGENT;
