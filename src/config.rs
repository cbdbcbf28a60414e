//! Runtime configuration for a mining run.
//!
//! Everything that would otherwise be process-global (pool size, timeouts,
//! endpoints, header profile) lives in [`MinerConfig`], owned by the
//! [`Miner`](crate::Miner) and handed to each component.

use std::time::Duration;

use crate::fetch::constants::{CONNECT_TIMEOUT_SECS, IMAGE_TIMEOUT_SECS, INDEX_TIMEOUT_SECS};
use crate::pipeline::{DEFAULT_CONCURRENCY, DOWNLOAD_JITTER, INDEX_JITTER, Jitter};
use crate::query::DEFAULT_ORIGIN;
use crate::user_agent::BROWSER_USER_AGENT;

/// Only thumbnail URLs under this prefix are downloaded.
pub const DEFAULT_ASSET_PREFIX: &str = "https://media.istockphoto.com/";

/// Network and concurrency settings for a [`Miner`](crate::Miner).
#[derive(Debug, Clone)]
pub struct MinerConfig {
    /// Catalog origin (scheme and host).
    pub origin: String,
    /// Required prefix of asset URLs.
    pub asset_prefix: String,
    /// Download worker count.
    pub concurrency: usize,
    /// Maximum concurrent index fetches; `None` fetches every page at once.
    pub index_concurrency: Option<usize>,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout for index pages.
    pub index_timeout: Option<Duration>,
    /// Whole-request timeout for asset downloads.
    pub image_timeout: Option<Duration>,
    /// Pause after each parsed index page.
    pub index_jitter: Jitter,
    /// Pause after each written asset.
    pub download_jitter: Jitter,
    /// User-Agent sent with every request.
    pub user_agent: String,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            asset_prefix: DEFAULT_ASSET_PREFIX.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            index_concurrency: None,
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            index_timeout: Some(Duration::from_secs(INDEX_TIMEOUT_SECS)),
            image_timeout: Some(Duration::from_secs(IMAGE_TIMEOUT_SECS)),
            index_jitter: INDEX_JITTER,
            download_jitter: DOWNLOAD_JITTER,
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

impl MinerConfig {
    /// Points the miner at another origin, e.g. a local mock server.
    ///
    /// The asset prefix follows the origin.
    #[must_use]
    pub fn with_origin(mut self, origin: &str) -> Self {
        let origin = origin.trim_end_matches('/');
        self.origin = origin.to_string();
        self.asset_prefix = format!("{origin}/");
        self
    }

    /// Sets the download worker count.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Disables both politeness pauses.
    #[must_use]
    pub fn without_jitter(mut self) -> Self {
        self.index_jitter = Jitter::disabled();
        self.download_jitter = Jitter::disabled();
        self
    }

    /// Index fetch parallelism for `pages` pages.
    #[must_use]
    pub fn index_parallelism(&self, pages: usize) -> usize {
        self.index_concurrency.unwrap_or(pages).clamp(1, pages.max(1))
    }
}
