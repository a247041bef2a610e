//! Parallel directory walker
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │         Walker          │
//!                     │  - stat + validate root │
//!                     │  - seed queue, pending=1│
//!                     └───────────┬─────────────┘
//!                                 │
//!                     ┌───────────▼─────────────┐
//!                     │   Work Queue (bounded)  │◄────────────┐
//!                     └───────────┬─────────────┘             │
//!       ┌─────────────────────────┼─────────────────────────┐ │ try_send
//! ┌─────▼─────┐             ┌─────▼─────┐             ┌─────▼─────┐
//! │  Worker 1 │             │  Worker 2 │             │  Worker N │
//! │  list dir │             │  list dir │             │  list dir │
//! │  inline if│             │  inline if│             │  inline if│
//! │  full     │             │  full     │             │  full     │
//! └───────────┘             └───────────┘             └───────────┘
//! ```
//!
//! Termination: `pending` counts directories that are queued or being
//! listed. A child is counted before it is offered to the queue, and a
//! worker decrements only after its directory's step has returned, so the
//! counter hits zero exactly once, when nothing is left. The worker that
//! takes it to zero fires the stop signal.

pub mod queue;
pub(crate) mod stop;
pub(crate) mod traverse;
pub(crate) mod worker;

use crate::config::{normalize_queue_capacity, normalize_threads, WalkConfig};
use crate::error::{Result, WalkerError, WorkerError};
use crate::fs::{FileSystem, LocalFs};
use crate::tree::DirectoryNode;
use queue::{QueueStats, WorkQueue};
use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicUsize;
use std::thread;
use std::time::{Duration, Instant};
use stop::StopSignal;
use tracing::{debug, info};
use traverse::WalkContext;
use worker::worker_loop;

/// Counters describing a completed walk
#[derive(Debug, Clone, Default)]
pub struct WalkSummary {
    /// Nodes in the tree, directories and leaves
    pub nodes: usize,

    /// Directories whose listing failed
    pub errors: usize,

    /// Directories handed to another worker through the queue
    pub enqueued: u64,

    /// Directories taken off the queue by workers
    pub dequeued: u64,

    /// Directories processed inline because the queue was full
    pub inline_processed: u64,

    /// Rejected queue submissions
    pub backpressure_events: u64,

    pub duration: Duration,
}

impl WalkSummary {
    fn collect(root: &DirectoryNode, stats: &QueueStats, duration: Duration) -> Self {
        use std::sync::atomic::Ordering;

        Self {
            nodes: root.total_length(),
            errors: root.errors().len(),
            enqueued: stats.enqueued.load(Ordering::Relaxed),
            dequeued: stats.throughput(),
            inline_processed: stats.inline_count(),
            backpressure_events: stats.backpressure_count(),
            duration,
        }
    }
}

/// Builds a directory tree rooted at a path
#[derive(Debug, Clone)]
pub struct Walker<F = LocalFs> {
    root: PathBuf,
    config: WalkConfig,
    fs: F,
}

impl Walker<LocalFs> {
    /// Walker over the local filesystem with default configuration
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_filesystem(root, LocalFs)
    }
}

impl<F: FileSystem> Walker<F> {
    /// Walker over any `FileSystem` implementation
    pub fn with_filesystem(root: impl Into<PathBuf>, fs: F) -> Self {
        Self {
            root: root.into(),
            config: WalkConfig::default(),
            fs,
        }
    }

    /// Worker count; zero or negative selects the default
    pub fn threads(mut self, threads: i64) -> Self {
        self.config.threads = normalize_threads(threads);
        self
    }

    /// Queue capacity; negative selects the default, zero means handoff only
    pub fn queue_capacity(mut self, capacity: i64) -> Self {
        self.config.queue_capacity = normalize_queue_capacity(capacity);
        self
    }

    pub fn config(mut self, config: WalkConfig) -> Self {
        self.config = config;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn walk_config(&self) -> &WalkConfig {
        &self.config
    }

    /// Walk the tree and return its root
    pub fn run(&self) -> Result<DirectoryNode> {
        self.run_with_summary().map(|(root, _)| root)
    }

    /// Walk the tree, also returning queue and error counters
    pub fn run_with_summary(&self) -> Result<(DirectoryNode, WalkSummary)> {
        let start = Instant::now();

        let metadata = self.fs.stat(&self.root).map_err(|source| WalkerError::Stat {
            path: self.root.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(WalkerError::NotADirectory {
                path: self.root.clone(),
            });
        }

        info!(
            root = %self.root.display(),
            threads = self.config.threads,
            queue_capacity = self.config.queue_capacity,
            "Starting directory walk"
        );

        let root = DirectoryNode::new(self.root.clone(), metadata);
        let queue = WorkQueue::new(self.config.queue_capacity);
        let stop = StopSignal::new();
        let pending = AtomicUsize::new(1);

        // A zero-capacity queue can only take the root once a worker waits
        let unseeded = queue.seed(root.clone()).err();

        thread::scope(|scope| -> std::result::Result<(), WorkerError> {
            let mut handles = Vec::with_capacity(self.config.threads);
            let mut spawn_error = None;

            for id in 0..self.config.threads {
                let ctx = WalkContext {
                    fs: &self.fs,
                    queue: queue.sender(),
                    stop: &stop,
                    pending: &pending,
                };
                let receiver = queue.receiver();

                match thread::Builder::new()
                    .name(format!("walker-{}", id))
                    .spawn_scoped(scope, move || worker_loop(id, receiver, ctx))
                {
                    Ok(handle) => handles.push((id, handle)),
                    Err(e) => {
                        stop.fire();
                        spawn_error = Some(WorkerError::SpawnFailed {
                            id,
                            reason: e.to_string(),
                        });
                        break;
                    }
                }
            }

            if let (Some(root), None) = (unseeded, &spawn_error) {
                queue.seed_blocking(root, stop.receiver());
            }

            let mut first_error = spawn_error;
            for (id, handle) in handles {
                match handle.join() {
                    Ok(processed) => debug!("Worker {} joined after {} directories", id, processed),
                    Err(payload) => {
                        first_error.get_or_insert(WorkerError::Panicked {
                            id,
                            message: panic_message(payload.as_ref()),
                        });
                    }
                }
            }

            first_error.map_or(Ok(()), Err)
        })?;

        let summary = WalkSummary::collect(&root, &queue.stats(), start.elapsed());
        info!(
            nodes = summary.nodes,
            errors = summary.errors,
            enqueued = summary.enqueued,
            dequeued = summary.dequeued,
            inline = summary.inline_processed,
            backpressure = summary.backpressure_events,
            duration_ms = summary.duration.as_millis() as u64,
            "Walk complete"
        );

        Ok((root, summary))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
