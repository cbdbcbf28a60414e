//! Error types for work queue operations.

use thiserror::Error;

use super::DownloadJob;

/// Errors that can occur when pushing onto the work queue.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The queue no longer accepts jobs; the job was not enqueued.
    #[error("work queue closed, dropped job for {}", .0.source_url)]
    Closed(DownloadJob),
}
