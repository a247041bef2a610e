//! dirtree - Concurrent In-Memory Directory Tree Builder
//!
//! Lists a directory hierarchy with a fixed pool of worker threads and
//! returns it as a tree of [`DirectoryNode`]s and [`Leaf`]s.
//!
//! # Features
//!
//! - **Parallel Listing**: Subdirectories are handed to a pool of worker
//!   threads through a bounded queue.
//!
//! - **Memory Bounded**: When the queue is full a worker lists the
//!   subdirectory itself instead of waiting, so the queue never grows past
//!   its capacity and a capacity of zero still makes progress.
//!
//! - **Failure Isolation**: A directory that cannot be opened or listed
//!   records its error on its own node. Siblings and ancestors are still
//!   walked; collect everything afterwards with [`DirectoryNode::errors`].
//!
//! - **Pluggable Filesystem**: All I/O goes through the [`fs::FileSystem`]
//!   trait; [`fs::LocalFs`] is the `std::fs` implementation.
//!
//! Symlinks are recorded as leaves and never followed.
//!
//! # Example
//!
//! ```no_run
//! use dirtree::Walker;
//!
//! let root = Walker::new("/home").threads(8).queue_capacity(256).run()?;
//! println!("{} nodes", root.total_length());
//! for err in root.errors() {
//!     eprintln!("{}", err);
//! }
//! # Ok::<(), dirtree::WalkerError>(())
//! ```

pub mod config;
pub mod error;
pub mod fs;
pub mod tree;
pub mod walker;

use std::path::PathBuf;

pub use config::{WalkConfig, DEFAULT_QUEUE_CAPACITY, DEFAULT_THREADS};
pub use error::{DirOp, NodeError, Result, WalkerError, WorkerError};
pub use tree::{DirectoryNode, Leaf, NodeRef};
pub use walker::{WalkSummary, Walker};

/// Walk `root` on the local filesystem
///
/// `threads <= 0` selects [`DEFAULT_THREADS`]; `queue_capacity < 0` selects
/// [`DEFAULT_QUEUE_CAPACITY`]; `queue_capacity == 0` is a rendezvous queue.
pub fn walk(root: impl Into<PathBuf>, threads: i64, queue_capacity: i64) -> Result<DirectoryNode> {
    Walker::new(root)
        .config(WalkConfig::new(threads, queue_capacity))
        .run()
}
