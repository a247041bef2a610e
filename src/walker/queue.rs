//! Work queue with backpressure support
//!
//! A bounded queue of directories waiting to be listed. Submitting never
//! blocks: when the queue is full the caller gets the directory back and
//! processes it inline instead.
//!
//! A capacity of zero is a rendezvous queue; a submit only succeeds when a
//! worker is already parked in `recv`.

use crate::tree::DirectoryNode;
use crossbeam_channel::{bounded, select, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Statistics for the work queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total directories enqueued
    pub enqueued: AtomicU64,

    /// Total directories dequeued
    pub dequeued: AtomicU64,

    /// Directories processed inline due to backpressure
    pub inline_processed: AtomicU64,

    /// Number of times backpressure was applied
    pub backpressure_events: AtomicU64,
}

impl QueueStats {
    /// Get queue throughput (dequeued directories)
    pub fn throughput(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    /// Get number of inline-processed directories
    pub fn inline_count(&self) -> u64 {
        self.inline_processed.load(Ordering::Relaxed)
    }

    /// Get backpressure event count
    pub fn backpressure_count(&self) -> u64 {
        self.backpressure_events.load(Ordering::Relaxed)
    }
}

/// Work queue with backpressure support
pub struct WorkQueue {
    sender: Sender<DirectoryNode>,
    receiver: Receiver<DirectoryNode>,
    capacity: usize,
    stats: Arc<QueueStats>,
}

impl WorkQueue {
    /// Create a new work queue with the specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);

        Self {
            sender,
            receiver,
            capacity,
            stats: Arc::new(QueueStats::default()),
        }
    }

    /// Get a sender for this queue (clone for each worker)
    pub fn sender(&self) -> WorkQueueSender {
        WorkQueueSender {
            sender: self.sender.clone(),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Get a receiver for this queue (clone for each worker)
    pub fn receiver(&self) -> WorkQueueReceiver {
        WorkQueueReceiver {
            receiver: self.receiver.clone(),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Get queue statistics
    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Seed the queue with the root directory without blocking
    ///
    /// Hands the root back if there is no room (always the case for a
    /// zero-capacity queue with no waiting worker).
    pub fn seed(&self, root: DirectoryNode) -> Result<(), DirectoryNode> {
        match self.sender.try_send(root) {
            Ok(()) => {
                self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(root)) | Err(TrySendError::Disconnected(root)) => Err(root),
        }
    }

    /// Block until a worker takes the root, or until `stop` closes
    ///
    /// Returns false if the stop signal won.
    pub fn seed_blocking(&self, root: DirectoryNode, stop: &Receiver<()>) -> bool {
        select! {
            send(self.sender, root) -> res => {
                if res.is_ok() {
                    self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
                }
                res.is_ok()
            }
            recv(stop) -> _ => false,
        }
    }
}

/// Handle for sending directories to the queue
#[derive(Clone)]
pub struct WorkQueueSender {
    sender: Sender<DirectoryNode>,
    stats: Arc<QueueStats>,
}

impl WorkQueueSender {
    /// Try to send a directory to the queue
    ///
    /// Returns `Err(node)` when the queue is full or closed; the caller then
    /// owns the directory again and must process it itself.
    pub fn try_send(&self, node: DirectoryNode) -> Result<(), DirectoryNode> {
        match self.sender.try_send(node) {
            Ok(()) => {
                self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(node)) => {
                self.stats.backpressure_events.fetch_add(1, Ordering::Relaxed);
                Err(node)
            }
            Err(TrySendError::Disconnected(node)) => Err(node),
        }
    }

    /// Record that a directory was processed inline (for stats)
    pub fn record_inline(&self) {
        self.stats.inline_processed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Handle for receiving directories from the queue
#[derive(Clone)]
pub struct WorkQueueReceiver {
    receiver: Receiver<DirectoryNode>,
    stats: Arc<QueueStats>,
}

impl WorkQueueReceiver {
    /// Underlying channel, for use in `select!`
    pub fn channel(&self) -> &Receiver<DirectoryNode> {
        &self.receiver
    }

    /// Count a directory taken through `channel`
    pub fn record_dequeue(&self) {
        self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
    }

    /// Try to receive a directory without blocking
    pub fn try_recv(&self) -> Option<DirectoryNode> {
        match self.receiver.try_recv() {
            Ok(node) => {
                self.record_dequeue();
                Some(node)
            }
            Err(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }
}
