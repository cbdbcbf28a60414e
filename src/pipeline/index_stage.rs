//! Index fetch stage: search result pages to download jobs.
//!
//! Each page goes `Pending → Fetching → {Parsed | Failed}`. A failed page
//! contributes zero jobs; the run continues. Pages are independent and
//! complete in any order.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, warn};

use super::jitter::Jitter;
use super::stats::MiningStats;
use crate::extract::MarkupExtractor;
use crate::fetch::HttpClient;
use crate::identity::{IdentityCache, asset_identity, asset_path};
use crate::queue::{DownloadJob, QueueProducer};

/// Terminal state of one index page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Page fetched and parsed; `enqueued` jobs were pushed.
    Parsed {
        /// URLs extracted from the gallery.
        discovered: usize,
        /// Jobs pushed onto the queue.
        enqueued: usize,
    },
    /// Connection failure or non-200 status; nothing was enqueued.
    Failed,
}

/// Fetches index pages and turns new asset URLs into jobs.
#[derive(Debug, Clone)]
pub struct IndexStage {
    client: HttpClient,
    extractor: MarkupExtractor,
    cache: Arc<IdentityCache>,
    destination: PathBuf,
    asset_prefix: String,
    timeout: Option<Duration>,
    jitter: Jitter,
    stats: Arc<MiningStats>,
}

impl IndexStage {
    /// Creates a stage writing jobs for `destination`.
    #[must_use]
    pub fn new(
        client: HttpClient,
        extractor: MarkupExtractor,
        cache: Arc<IdentityCache>,
        destination: PathBuf,
        stats: Arc<MiningStats>,
    ) -> Self {
        Self {
            client,
            extractor,
            cache,
            destination,
            asset_prefix: crate::config::DEFAULT_ASSET_PREFIX.to_string(),
            timeout: None,
            jitter: Jitter::disabled(),
            stats,
        }
    }

    /// Only URLs starting with `prefix` become jobs.
    #[must_use]
    pub fn with_asset_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.asset_prefix = prefix.into();
        self
    }

    /// Per-request timeout for index pages.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Pause after each parsed page.
    #[must_use]
    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// Processes every page concurrently, at most `concurrency` at a time.
    ///
    /// Returns once every page has settled. Each page task owns a clone of
    /// `producer`; all clones are dropped by the time this returns, which
    /// lets the work queue signal completion.
    #[instrument(skip(self, urls, producer), fields(pages = urls.len()))]
    pub async fn run(
        self: Arc<Self>,
        urls: Vec<String>,
        producer: QueueProducer,
        concurrency: usize,
    ) {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let total = urls.len();
        let mut handles = Vec::with_capacity(total);

        for url in urls {
            let stage = Arc::clone(&self);
            let producer = producer.clone();
            let semaphore = Arc::clone(&semaphore);
            handles.push(tokio::spawn(async move {
                // Closed only on drop, which cannot happen while we hold the Arc.
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                let outcome = stage.process_page(&url, &producer).await;
                drop(producer);
                let done = stage.stats.pages_parsed() + stage.stats.pages_failed();
                let progress = format!("{done}/{total}");
                match outcome {
                    PageOutcome::Parsed {
                        discovered,
                        enqueued,
                    } => debug!(%progress, src = %url, discovered, enqueued, "index page parsed"),
                    PageOutcome::Failed => debug!(%progress, src = %url, "index page dropped"),
                }
            }));
        }
        drop(producer);

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "index task panicked");
            }
        }

        info!(
            parsed = self.stats.pages_parsed(),
            failed = self.stats.pages_failed(),
            enqueued = self.stats.jobs_enqueued(),
            "index stage complete"
        );
    }

    /// Fetches one page and enqueues its new assets.
    #[instrument(skip(self, producer), fields(url = %url))]
    pub async fn process_page(&self, url: &str, producer: &QueueProducer) -> PageOutcome {
        self.stats.increment_pages_requested();

        let body = match self.client.fetch_page(url, self.timeout).await {
            Ok(body) => body,
            Err(e) if e.is_connection_failure() => {
                error!(error = %e, "index page connection error");
                self.stats.increment_pages_failed();
                return PageOutcome::Failed;
            }
            Err(e) => {
                warn!(error = %e, "unexpected index page response");
                self.stats.increment_pages_failed();
                return PageOutcome::Failed;
            }
        };

        let urls = self.extractor.extract_asset_urls(&body);
        let discovered = urls.len();
        let enqueued = self.enqueue_new(urls, producer);
        self.stats.increment_pages_parsed();

        self.jitter.pause().await;
        PageOutcome::Parsed {
            discovered,
            enqueued,
        }
    }

    /// Filters extracted URLs and pushes jobs for unknown identities.
    ///
    /// Returns the number of jobs pushed.
    pub fn enqueue_new(&self, urls: Vec<String>, producer: &QueueProducer) -> usize {
        let mut enqueued = 0;
        for url in urls {
            self.stats.increment_urls_discovered();

            if !url.starts_with(&self.asset_prefix) {
                debug!(url = %url, "dropping url outside asset prefix");
                self.stats.increment_urls_rejected();
                continue;
            }
            let Some(identity) = asset_identity(&url) else {
                debug!(url = %url, "dropping url without asset identity");
                self.stats.increment_urls_rejected();
                continue;
            };
            if !self.cache.claim(&identity) {
                self.stats.increment_skipped_existing();
                continue;
            }

            let job = DownloadJob::new(url, asset_path(&self.destination, &identity));
            match producer.push(job) {
                Ok(()) => {
                    self.stats.increment_jobs_enqueued();
                    enqueued += 1;
                }
                Err(e) => warn!(error = %e, "failed to enqueue download job"),
            }
        }
        enqueued
    }
}
