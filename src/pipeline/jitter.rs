//! Randomised pauses between requests.

use std::time::Duration;

use rand::Rng;

/// A random pause drawn uniformly from `min..=max` milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jitter {
    min_ms: u64,
    max_ms: u64,
}

/// Pause after each parsed index page.
pub const INDEX_JITTER: Jitter = Jitter::new(20, 300);

/// Pause after each written asset.
pub const DOWNLOAD_JITTER: Jitter = Jitter::new(20, 50);

impl Jitter {
    /// Creates a jitter range; bounds are swapped if given in reverse.
    #[must_use]
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        if min_ms <= max_ms {
            Self { min_ms, max_ms }
        } else {
            Self {
                min_ms: max_ms,
                max_ms: min_ms,
            }
        }
    }

    /// No pause at all.
    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(0, 0)
    }

    /// Returns true if pauses are always zero.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.max_ms == 0
    }

    /// Draws one pause duration.
    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.min_ms == self.max_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::thread_rng().gen_range(self.min_ms..=self.max_ms))
    }

    /// Sleeps for one sampled duration.
    pub async fn pause(&self) {
        if self.is_disabled() {
            return;
        }
        let delay = self.sample();
        tokio::time::sleep(delay).await;
    }
}
