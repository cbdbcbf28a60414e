//! Run instrumentation shared by the index and download stages.
//!
//! Counters are observational only; nothing in the pipeline branches on them.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

/// Counters for one mining run.
///
/// Uses atomic counters for updates from concurrent index tasks and
/// download workers.
#[derive(Debug, Default)]
pub struct MiningStats {
    pages_requested: AtomicUsize,
    pages_parsed: AtomicUsize,
    pages_failed: AtomicUsize,
    urls_discovered: AtomicUsize,
    urls_rejected: AtomicUsize,
    skipped_existing: AtomicUsize,
    jobs_enqueued: AtomicUsize,
    assets_written: AtomicUsize,
    assets_failed: AtomicUsize,
}

/// Plain copy of [`MiningStats`] at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Index pages dispatched.
    pub pages_requested: usize,
    /// Index pages fetched and parsed.
    pub pages_parsed: usize,
    /// Index pages dropped after a connection or status failure.
    pub pages_failed: usize,
    /// Asset URLs found in parsed pages.
    pub urls_discovered: usize,
    /// URLs dropped for a foreign prefix or an underivable identity.
    pub urls_rejected: usize,
    /// Identities already on disk or already enqueued.
    pub skipped_existing: usize,
    /// Download jobs pushed onto the work queue.
    pub jobs_enqueued: usize,
    /// Assets written to disk.
    pub assets_written: usize,
    /// Download jobs dropped after a failed attempt.
    pub assets_failed: usize,
}

macro_rules! counter {
    ($get:ident, $incr:ident) => {
        /// Current value.
        #[must_use]
        pub fn $get(&self) -> usize {
            self.$get.load(Ordering::SeqCst)
        }

        pub(crate) fn $incr(&self) {
            self.$get.fetch_add(1, Ordering::SeqCst);
        }
    };
}

impl MiningStats {
    /// Creates a tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    counter!(pages_requested, increment_pages_requested);
    counter!(pages_parsed, increment_pages_parsed);
    counter!(pages_failed, increment_pages_failed);
    counter!(urls_discovered, increment_urls_discovered);
    counter!(urls_rejected, increment_urls_rejected);
    counter!(skipped_existing, increment_skipped_existing);
    counter!(jobs_enqueued, increment_jobs_enqueued);
    counter!(assets_written, increment_assets_written);
    counter!(assets_failed, increment_assets_failed);

    /// Jobs that reached a terminal state (written or failed).
    #[must_use]
    pub fn assets_settled(&self) -> usize {
        self.assets_written() + self.assets_failed()
    }

    /// Copies the current values.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_requested: self.pages_requested(),
            pages_parsed: self.pages_parsed(),
            pages_failed: self.pages_failed(),
            urls_discovered: self.urls_discovered(),
            urls_rejected: self.urls_rejected(),
            skipped_existing: self.skipped_existing(),
            jobs_enqueued: self.jobs_enqueued(),
            assets_written: self.assets_written(),
            assets_failed: self.assets_failed(),
        }
    }
}
