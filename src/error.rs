//! Error types for dirtree
//!
//! Two layers of failure exist:
//! - `WalkerError`: fatal, returned from a run, no tree is produced
//! - `NodeError`: a single directory could not be opened or listed; it is
//!   recorded on that node and collected later with `DirectoryNode::errors`
//!
//! Configuration values that are out of range are replaced by defaults and
//! are never reported as errors.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for a walk
#[derive(Error, Debug)]
pub enum WalkerError {
    /// The root path could not be stat'ed (missing, inaccessible, ...)
    #[error("Failed to stat '{}': {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The root path exists but is not a directory
    #[error("'{}': not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

impl WalkerError {
    /// The `io::ErrorKind` behind a stat failure, if that is what this is
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            WalkerError::Stat { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker thread could not be started
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },
}

/// Which directory operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirOp {
    /// Opening the directory handle
    Open,
    /// Reading entries from an open handle
    List,
}

impl fmt::Display for DirOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirOp::Open => f.write_str("open"),
            DirOp::List => f.write_str("list"),
        }
    }
}

/// A failure recorded on a single directory node
///
/// The subtree below the node is left empty; siblings and ancestors are
/// unaffected.
#[derive(Error, Debug)]
#[error("Failed to {op} directory '{}': {source}", path.display())]
pub struct NodeError {
    pub path: PathBuf,
    pub op: DirOp,
    #[source]
    pub source: io::Error,
}

impl NodeError {
    pub fn new(path: impl Into<PathBuf>, op: DirOp, source: io::Error) -> Self {
        Self {
            path: path.into(),
            op,
            source,
        }
    }

    /// Kind of the underlying I/O failure
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }

    pub fn is_permission_denied(&self) -> bool {
        self.kind() == io::ErrorKind::PermissionDenied
    }

    /// Entries that vanish mid-walk are common on live filesystems
    pub fn is_not_found(&self) -> bool {
        self.kind() == io::ErrorKind::NotFound
    }
}

/// Result type alias for WalkerError
pub type Result<T> = std::result::Result<T, WalkerError>;
