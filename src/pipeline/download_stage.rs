//! Download stage: a fixed pool of workers draining the work queue.
//!
//! Each job goes `Queued → Fetching → {Written | Failed}` with a single
//! attempt. Workers exit when [`WorkQueue::pop`] reports the queue finished,
//! i.e. it is closed, every producer is gone and no job is left.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use super::jitter::Jitter;
use super::stats::MiningStats;
use crate::fetch::HttpClient;
use crate::queue::{DownloadJob, WorkQueue};

/// Minimum allowed worker count.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed worker count.
pub const MAX_CONCURRENCY: usize = 32;

/// Default worker count.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Error type for download pool construction.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },
}

/// Terminal state of one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Body written to the destination path.
    Written {
        /// Bytes written.
        bytes: u64,
    },
    /// Fetch or write failed; the job is dropped.
    Failed,
}

/// Fixed-size pool of download workers.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use istock_miner::fetch::HttpClient;
/// use istock_miner::pipeline::{DownloadPool, MiningStats};
/// use istock_miner::queue::{DownloadJob, WorkQueue};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let queue = Arc::new(WorkQueue::new());
/// queue.push(DownloadJob::new("https://media.istockphoto.com/id/1/photo/a.jpg", "1.jpg"))?;
/// queue.close();
///
/// let stats = Arc::new(MiningStats::new());
/// let pool = DownloadPool::new(4, HttpClient::new()?, Arc::clone(&stats))?;
/// pool.run(queue).await;
/// println!("written: {}", stats.assets_written());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DownloadPool {
    workers: usize,
    client: HttpClient,
    timeout: Option<Duration>,
    jitter: Jitter,
    stats: Arc<MiningStats>,
}

impl DownloadPool {
    /// Creates a pool of `workers` concurrent downloaders.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConcurrency`] if `workers` is outside
    /// `MIN_CONCURRENCY..=MAX_CONCURRENCY`.
    #[instrument(level = "debug", skip(client, stats))]
    pub fn new(
        workers: usize,
        client: HttpClient,
        stats: Arc<MiningStats>,
    ) -> Result<Self, PoolError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&workers) {
            return Err(PoolError::InvalidConcurrency { value: workers });
        }
        Ok(Self {
            workers,
            client,
            timeout: None,
            jitter: Jitter::disabled(),
            stats,
        })
    }

    /// Per-request timeout for asset downloads.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Pause after each written asset.
    #[must_use]
    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// Configured worker count.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs the workers until the queue is finished, then joins them.
    ///
    /// Individual failures never abort the pool.
    #[instrument(skip(self, queue), fields(workers = self.workers))]
    pub async fn run(&self, queue: Arc<WorkQueue>) {
        let mut handles = Vec::with_capacity(self.workers);
        for worker in 0..self.workers {
            let pool = self.clone();
            let queue = Arc::clone(&queue);
            handles.push(tokio::spawn(async move {
                pool.work(worker, &queue).await;
            }));
        }

        debug!(task_count = handles.len(), "waiting for workers to drain queue");
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "download worker panicked");
            }
        }

        info!(
            written = self.stats.assets_written(),
            failed = self.stats.assets_failed(),
            "download stage complete"
        );
    }

    async fn work(&self, worker: usize, queue: &WorkQueue) {
        while let Some(job) = queue.pop().await {
            if let JobOutcome::Written { .. } = self.download(&job).await {
                self.jitter.pause().await;
            }
        }
        debug!(worker, "worker finished");
    }

    /// Performs the single allowed attempt for `job`.
    #[instrument(skip(self, job), fields(url = %job.source_url))]
    pub async fn download(&self, job: &DownloadJob) -> JobOutcome {
        match self
            .client
            .download_to_path(&job.source_url, &job.destination, self.timeout)
            .await
        {
            Ok(bytes) => {
                self.stats.increment_assets_written();
                debug!(
                    progress = %format!(
                        "{}/{}",
                        self.stats.assets_settled(),
                        self.stats.jobs_enqueued()
                    ),
                    path = %job.destination.display(),
                    bytes,
                    "download image"
                );
                JobOutcome::Written { bytes }
            }
            Err(e) => {
                if e.is_connection_failure() {
                    error!(error = %e, "image download connection error");
                } else {
                    warn!(error = %e, "image download failed");
                }
                self.stats.increment_assets_failed();
                JobOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn stats() -> Arc<MiningStats> {
        Arc::new(MiningStats::new())
    }

    #[test]
    fn test_pool_new_valid_concurrency() {
        for workers in [1, 16, 32] {
            let pool = DownloadPool::new(workers, HttpClient::new().unwrap(), stats()).unwrap();
            assert_eq!(pool.workers(), workers);
        }
    }

    #[test]
    fn test_pool_new_invalid_concurrency() {
        for workers in [0, 33] {
            let result = DownloadPool::new(workers, HttpClient::new().unwrap(), stats());
            assert!(matches!(
                result,
                Err(PoolError::InvalidConcurrency { value }) if value == workers
            ));
        }
    }

    #[test]
    fn test_pool_error_display() {
        let msg = PoolError::InvalidConcurrency { value: 0 }.to_string();
        assert!(msg.contains("invalid concurrency"));
        assert!(msg.contains("32"));
    }

    #[tokio::test]
    async fn test_run_on_finished_empty_queue_returns() {
        let queue = Arc::new(WorkQueue::new());
        queue.close();
        let stats = stats();
        let pool = DownloadPool::new(4, HttpClient::new().unwrap(), Arc::clone(&stats)).unwrap();
        pool.run(queue).await;
        assert_eq!(stats.assets_settled(), 0);
    }

    #[tokio::test]
    async fn test_failed_job_is_counted_not_retried() {
        let queue = Arc::new(WorkQueue::new());
        let dir = tempfile::TempDir::new().unwrap();
        queue
            .push(DownloadJob::new("not a url", dir.path().join("x.jpg")))
            .unwrap();
        queue.close();

        let stats = stats();
        let pool = DownloadPool::new(2, HttpClient::new().unwrap(), Arc::clone(&stats)).unwrap();
        pool.run(queue).await;

        assert_eq!(stats.assets_failed(), 1);
        assert_eq!(stats.assets_written(), 0);
        assert!(!dir.path().join("x.jpg").exists());
    }
}
