//! Download job type.

use std::path::PathBuf;

/// One asset to fetch and where to write it.
///
/// Created by the index stage and consumed by exactly one download worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    /// Thumbnail URL.
    pub source_url: String,
    /// File the body is written to.
    pub destination: PathBuf,
}

impl DownloadJob {
    /// Creates a job.
    #[must_use]
    pub fn new(source_url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source_url: source_url.into(),
            destination: destination.into(),
        }
    }
}
