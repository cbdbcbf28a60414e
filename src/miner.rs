//! Orchestration of a mining run.
//!
//! A run prepares the destination directory and its identity cache, then
//! runs the index stage and the download pool side by side: index tasks
//! stream jobs into the work queue while workers drain it. The queue only
//! finishes once every index task has settled, so workers never exit on a
//! momentarily empty queue.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::config::MinerConfig;
use crate::extract::{ExtractError, MarkupExtractor};
use crate::fetch::{FetchError, HttpClient};
use crate::identity::{IMAGE_EXTENSION, IdentityCache};
use crate::layout::DatasetLayout;
use crate::pipeline::{DownloadPool, IndexStage, MiningStats, PoolError, StatsSnapshot};
use crate::query::{QueryBuilder, SearchCriteria, SimilarityKind};
use crate::queue::WorkQueue;

/// Errors that stop a run before any page is fetched.
///
/// Page and asset failures are never reported here; they are logged and
/// counted in [`MiningStats`].
#[derive(Debug, Error)]
pub enum MinerError {
    /// The destination directory could not be created or scanned.
    #[error("failed to prepare destination {path}: {source}")]
    Destination {
        /// The destination directory.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The download pool configuration is invalid.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// The HTTP client could not be built.
    #[error(transparent)]
    Client(#[from] FetchError),

    /// The markup extractor could not be built.
    #[error(transparent)]
    Extractor(#[from] ExtractError),
}

/// Outcome of a similarity probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimilarityProbe {
    /// Similarity endpoint that was probed.
    pub endpoint: String,
    /// Whether the endpoint answered 200.
    pub found: bool,
    /// Result count text shown on the page, if any.
    pub file_count: Option<String>,
    /// Destination used by the following run.
    pub destination: PathBuf,
}

/// Completion report of one run.
#[derive(Debug, Clone, Serialize)]
pub struct MiningReport {
    /// Directory the images were written to.
    pub destination: PathBuf,
    /// Criteria the run used.
    pub criteria: SearchCriteria,
    /// Final counter values.
    pub stats: StatsSnapshot,
}

/// Crawls index pages for one phrase and downloads new thumbnails.
///
/// # Example
///
/// ```no_run
/// use istock_miner::{DatasetLayout, Miner, MinerConfig, SearchCriteria};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let criteria = SearchCriteria::new("dog").with_page_count(2);
/// let miner = Miner::new(criteria, DatasetLayout::default(), MinerConfig::default())?;
/// let report = miner.mine().await?;
/// println!("{} new images in {}", report.stats.assets_written, report.destination.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Miner {
    criteria: SearchCriteria,
    layout: DatasetLayout,
    config: MinerConfig,
    query: QueryBuilder,
    destination: PathBuf,
    client: HttpClient,
    extractor: MarkupExtractor,
}

impl Miner {
    /// Creates a miner for phrase search.
    ///
    /// # Errors
    ///
    /// Returns [`MinerError::Pool`] for an out-of-range worker count, or
    /// [`MinerError::Client`] if the HTTP client cannot be built.
    pub fn new(
        criteria: SearchCriteria,
        layout: DatasetLayout,
        config: MinerConfig,
    ) -> Result<Self, MinerError> {
        let client =
            HttpClient::with_options(config.connect_timeout.as_secs(), &config.user_agent)?;
        // Validate the pool size up front rather than after the crawl.
        DownloadPool::new(config.concurrency, client.clone(), Arc::new(MiningStats::new()))?;

        let destination = layout.phrase_dir(criteria.phrase());
        Ok(Self {
            query: QueryBuilder::new(&config.origin),
            extractor: MarkupExtractor::new()?,
            criteria,
            layout,
            config,
            destination,
            client,
        })
    }

    /// Criteria of this miner.
    #[must_use]
    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    /// Directory the next run writes to.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Query builder in its current mode.
    #[must_use]
    pub fn query(&self) -> &QueryBuilder {
        &self.query
    }

    /// Switches to similarity search around `asset_id`.
    ///
    /// The endpoint and destination change for every later run, even when
    /// the probe fails. The probe itself enqueues nothing; it only checks
    /// that the source asset exists and reports the result count.
    #[instrument(skip(self), fields(phrase = %self.criteria.phrase()))]
    pub async fn more_like_this(
        &mut self,
        asset_id: &str,
        kind: SimilarityKind,
    ) -> SimilarityProbe {
        let asset_id = asset_id.trim();
        let asset_id = asset_id
            .strip_suffix(&format!(".{IMAGE_EXTENSION}"))
            .unwrap_or(asset_id);

        self.query.similar_to(asset_id, kind);
        self.destination = self.layout.similar_dir(self.criteria.phrase(), asset_id);
        let endpoint = self.query.endpoint_url();
        debug!(endpoint = %endpoint, destination = %self.destination.display(), "similarity mode");

        let (found, file_count) = match self
            .client
            .fetch_page(&endpoint, self.config.index_timeout)
            .await
        {
            Ok(body) => {
                let file_count = self.extractor.extract_file_count(&body);
                info!(file_count = file_count.as_deref().unwrap_or("unknown"), "search");
                (true, file_count)
            }
            Err(e) => {
                error!(asset_id, error = %e, "could not find source image");
                (false, None)
            }
        };

        SimilarityProbe {
            endpoint,
            found,
            file_count,
            destination: self.destination.clone(),
        }
    }

    /// Runs the crawl and returns once every job has settled.
    ///
    /// A disabled run (empty phrase) returns immediately without touching
    /// the network or the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`MinerError::Destination`] if the destination directory
    /// cannot be created or listed. Failed pages and downloads are not errors.
    #[instrument(
        skip(self),
        fields(phrase = %self.criteria.phrase(), pages = self.criteria.page_count())
    )]
    pub async fn mine(&self) -> Result<MiningReport, MinerError> {
        let stats = Arc::new(MiningStats::new());
        if self.criteria.is_disabled() {
            warn!("empty phrase, nothing to mine");
            return Ok(self.report(&stats));
        }

        let cache = self.prepare_destination().await?;
        let urls = self.query.index_urls(&self.criteria);
        info!(
            size = urls.len(),
            known = cache.len(),
            destination = %self.destination.display(),
            "preload"
        );

        let (queue, producer) = WorkQueue::open();
        let queue = Arc::new(queue);

        let stage = IndexStage::new(
            self.client.clone(),
            self.extractor.clone(),
            Arc::new(cache),
            self.destination.clone(),
            Arc::clone(&stats),
        )
        .with_asset_prefix(self.config.asset_prefix.clone())
        .with_timeout(self.config.index_timeout)
        .with_jitter(self.config.index_jitter);
        let parallelism = self.config.index_parallelism(urls.len());
        let index_task = tokio::spawn(Arc::new(stage).run(urls, producer, parallelism));

        let pool = DownloadPool::new(
            self.config.concurrency,
            self.client.clone(),
            Arc::clone(&stats),
        )?
        .with_timeout(self.config.image_timeout)
        .with_jitter(self.config.download_jitter);
        pool.run(Arc::clone(&queue)).await;

        if let Err(e) = index_task.await {
            warn!(error = %e, "index stage panicked");
        }

        let report = self.report(&stats);
        info!(
            offload = %absolute_display(&self.destination),
            written = report.stats.assets_written,
            failed = report.stats.assets_failed,
            skipped = report.stats.skipped_existing,
            "task complete"
        );
        Ok(report)
    }

    async fn prepare_destination(&self) -> Result<IdentityCache, MinerError> {
        let destination_error = |source| MinerError::Destination {
            path: self.destination.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.destination)
            .await
            .map_err(destination_error)?;

        let dir = self.destination.clone();
        tokio::task::spawn_blocking(move || IdentityCache::load(&dir))
            .await
            .map_err(|e| destination_error(std::io::Error::other(e)))?
            .map_err(destination_error)
    }

    fn report(&self, stats: &MiningStats) -> MiningReport {
        MiningReport {
            destination: self.destination.clone(),
            criteria: self.criteria.clone(),
            stats: stats.snapshot(),
        }
    }
}

fn absolute_display(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
