//! Filesystem access module
//!
//! The walker never touches `std::fs` directly. Everything it needs goes
//! through the [`FileSystem`] trait:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   FileSystem                         │
//! │  - stat(path)      -> Metadata (follows symlinks)    │
//! │  - open_dir(path)  -> iterator of FsEntry            │
//! │                       (entries are NOT followed)     │
//! └─────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                    LocalFs                           │
//! │  - std::fs::metadata / read_dir / symlink_metadata   │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Alternate implementations (in-memory trees, fault injection) plug in
//! through [`crate::Walker::with_filesystem`].

mod local;
pub mod types;

use std::io;
use std::path::Path;

pub use local::{LocalFs, LocalReadDir};
pub use types::{EntryType, FsEntry, Metadata, Permissions};

/// Directory listing capability used by the walker
///
/// Implementations are shared by every worker thread.
///
/// Directories that overflow the work queue are listed by recursion on the
/// current worker's stack, one frame per level. Real filesystems stay well
/// inside that (PATH_MAX bounds depth to a few thousand levels); synthetic
/// implementations serving much deeper chains should use a queue capacity
/// large enough that overflow stays rare.
pub trait FileSystem: Send + Sync {
    /// Iterator over the immediate entries of an open directory
    type ReadDir: Iterator<Item = io::Result<FsEntry>>;

    /// Stat a path, following symlinks
    fn stat(&self, path: &Path) -> io::Result<Metadata>;

    /// Open a directory for listing
    fn open_dir(&self, path: &Path) -> io::Result<Self::ReadDir>;
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
    type ReadDir = F::ReadDir;

    fn stat(&self, path: &Path) -> io::Result<Metadata> {
        (**self).stat(path)
    }

    fn open_dir(&self, path: &Path) -> io::Result<Self::ReadDir> {
        (**self).open_dir(path)
    }
}
