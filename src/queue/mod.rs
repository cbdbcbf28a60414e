//! Shared FIFO of download jobs with an explicit completion signal.
//!
//! The queue is a multi-producer, multi-consumer wrapper around an unbounded
//! tokio channel:
//! - producers (index tasks) each hold a [`QueueProducer`]
//! - consumers (download workers) share the receiver through [`WorkQueue::pop`]
//! - [`WorkQueue::close`] drops the queue's own sender
//!
//! Once the queue is closed and every producer has been dropped, `pop`
//! returns `None` after the remaining jobs are drained. A momentarily empty
//! queue therefore never ends a worker while an index fetch is in flight.
//!
//! # Example
//!
//! ```
//! use istock_miner::queue::{DownloadJob, WorkQueue};
//!
//! # async fn example() {
//! let queue = WorkQueue::new();
//! let producer = queue.producer().unwrap();
//! queue.close();
//!
//! producer.push(DownloadJob::new("https://media.example.com/id/1/a.jpg", "1.jpg")).unwrap();
//! drop(producer);
//!
//! assert!(queue.pop().await.is_some());
//! assert!(queue.pop().await.is_none());
//! # }
//! ```

mod error;
mod job;

pub use error::QueueError;
pub use job::DownloadJob;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace};

/// Work queue shared by the index stage and the download pool.
#[derive(Debug)]
pub struct WorkQueue {
    sender: Mutex<Option<UnboundedSender<DownloadJob>>>,
    receiver: tokio::sync::Mutex<UnboundedReceiver<DownloadJob>>,
    pending: Arc<AtomicUsize>,
}

/// Producer handle; the queue stays open while any handle is alive.
#[derive(Debug, Clone)]
pub struct QueueProducer {
    sender: UnboundedSender<DownloadJob>,
    pending: Arc<AtomicUsize>,
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkQueue {
    /// Creates an open, empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender: Mutex::new(Some(sender)),
            receiver: tokio::sync::Mutex::new(receiver),
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a queue that is already closed to new producers and returns
    /// its only producer handle.
    ///
    /// The queue finishes as soon as that handle and all of its clones are
    /// dropped.
    #[must_use]
    pub fn open() -> (Self, QueueProducer) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        let producer = QueueProducer {
            sender,
            pending: Arc::clone(&pending),
        };
        let queue = Self {
            sender: Mutex::new(None),
            receiver: tokio::sync::Mutex::new(receiver),
            pending,
        };
        (queue, producer)
    }

    /// Returns a new producer handle, or `None` once the queue is closed.
    #[must_use]
    pub fn producer(&self) -> Option<QueueProducer> {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()?;
        Some(QueueProducer {
            sender,
            pending: Arc::clone(&self.pending),
        })
    }

    /// Pushes a job through the queue's own sender.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] with the job if the queue was closed.
    pub fn push(&self, job: DownloadJob) -> Result<(), QueueError> {
        match self.producer() {
            Some(producer) => producer.push(job),
            None => Err(QueueError::Closed(job)),
        }
    }

    /// Stops accepting new producers.
    ///
    /// Existing producers may keep pushing until they are dropped.
    pub fn close(&self) {
        let previous = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            debug!(pending = self.len(), "work queue closed to new producers");
        }
    }

    /// Takes the next job, waiting while producers are still active.
    ///
    /// Returns `None` once the queue is closed, all producers are gone and
    /// every job has been handed out. Each job is returned to exactly one
    /// caller.
    pub async fn pop(&self) -> Option<DownloadJob> {
        let job = self.receiver.lock().await.recv().await?;
        self.pending.fetch_sub(1, Ordering::SeqCst);
        trace!(url = %job.source_url, "job dequeued");
        Some(job)
    }

    /// Number of jobs enqueued but not yet handed out.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Returns true if no job is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QueueProducer {
    /// Enqueues a job.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] with the job if the queue itself was
    /// dropped.
    pub fn push(&self, job: DownloadJob) -> Result<(), QueueError> {
        // Count first so `len` never underflows when a worker pops immediately.
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.sender.send(job).map_err(|mpsc::error::SendError(job)| {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            QueueError::Closed(job)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn job(n: usize) -> DownloadJob {
        DownloadJob::new(
            format!("https://media.example.com/id/{n}/photo/x.jpg"),
            format!("{n}.jpg"),
        )
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = WorkQueue::new();
        for n in 0..3 {
            queue.push(job(n)).unwrap();
        }
        queue.close();
        assert_eq!(queue.len(), 3);
        for n in 0..3 {
            assert_eq!(queue.pop().await.unwrap(), job(n));
        }
        assert!(queue.pop().await.is_none());
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_open_queue_finishes_with_its_producer() {
        let (queue, producer) = WorkQueue::open();
        assert!(queue.producer().is_none());
        let second = producer.clone();
        producer.push(job(1)).unwrap();
        drop(producer);
        second.push(job(2)).unwrap();
        drop(second);

        assert_eq!(queue.pop().await, Some(job(1)));
        assert_eq!(queue.pop().await, Some(job(2)));
        assert_eq!(queue.pop().await, None);
    }

    #[tokio::test]
    async fn test_push_after_close_is_rejected() {
        let queue = WorkQueue::new();
        queue.close();
        assert!(queue.producer().is_none());
        assert!(matches!(queue.push(job(1)), Err(QueueError::Closed(_))));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_pop_waits_for_live_producer() {
        let queue = Arc::new(WorkQueue::new());
        let producer = queue.producer().unwrap();
        queue.close();

        let consumer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.pop().await })
        };

        // Empty but not finished: the consumer must still be waiting.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!consumer.is_finished());

        producer.push(job(7)).unwrap();
        drop(producer);
        assert_eq!(consumer.await.unwrap(), Some(job(7)));
        assert!(queue.pop().await.is_none());
    }

    #[tokio::test]
    async fn test_each_job_is_handed_out_once() {
        let queue = Arc::new(WorkQueue::new());
        for n in 0..50 {
            queue.push(job(n)).unwrap();
        }
        queue.close();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let queue = Arc::clone(&queue);
            handles.push(tokio::spawn(async move {
                let mut taken = Vec::new();
                while let Some(job) = queue.pop().await {
                    taken.push(job.source_url);
                }
                taken
            }));
        }

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.await.unwrap());
        }
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 50);
    }
}
