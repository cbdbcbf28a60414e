//! Crawl-and-download pipeline stages.
//!
//! - [`IndexStage`] fetches index pages and produces [`DownloadJob`](crate::queue::DownloadJob)s
//! - [`DownloadPool`] drains the [`WorkQueue`](crate::queue::WorkQueue) with a fixed worker pool
//! - [`MiningStats`] counts what both stages did

mod download_stage;
mod index_stage;
mod jitter;
mod stats;

pub use download_stage::{
    DEFAULT_CONCURRENCY, DownloadPool, JobOutcome, MAX_CONCURRENCY, MIN_CONCURRENCY, PoolError,
};
pub use index_stage::{IndexStage, PageOutcome};
pub use jitter::{DOWNLOAD_JITTER, INDEX_JITTER, Jitter};
pub use stats::{MiningStats, StatsSnapshot};
