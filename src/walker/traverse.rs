//! Traversal step: list one directory and hand off its subdirectories

use crate::error::{DirOp, NodeError};
use crate::fs::{FileSystem, FsEntry};
use crate::tree::{Contents, DirectoryNode, Leaf};
use crate::walker::queue::WorkQueueSender;
use crate::walker::stop::StopSignal;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace, warn};

/// State shared by every traversal step of one walk
pub(crate) struct WalkContext<'a, F> {
    pub fs: &'a F,
    pub queue: WorkQueueSender,
    pub stop: &'a StopSignal,
    /// Directories enqueued or in progress but not yet finished
    pub pending: &'a AtomicUsize,
}

/// List `dir`, publish its contents, then submit each child directory
///
/// Children that do not fit in the queue are traversed right here, before
/// the remaining siblings. Never blocks on the queue.
pub(crate) fn traverse<F: FileSystem>(dir: &DirectoryNode, ctx: &WalkContext<'_, F>) {
    dir.publish(list(dir, ctx.fs));

    for child in dir.children() {
        if ctx.stop.is_fired() {
            debug!(path = %dir.path().display(), "Stop signalled, abandoning remaining subdirectories");
            return;
        }

        // Count the child before it becomes visible to other workers
        ctx.pending.fetch_add(1, Ordering::SeqCst);
        if let Err(child) = ctx.queue.try_send(child.clone()) {
            ctx.pending.fetch_sub(1, Ordering::SeqCst);
            ctx.queue.record_inline();
            trace!(path = %child.path().display(), "Queue full, processing inline");
            traverse(&child, ctx);
        }
    }
}

fn list<F: FileSystem>(dir: &DirectoryNode, fs: &F) -> Contents {
    let path = dir.path();

    let entries = match fs.open_dir(path) {
        Ok(entries) => entries,
        Err(e) => return failed(NodeError::new(path, DirOp::Open, e)),
    };

    let mut contents = Contents::default();
    for entry in entries {
        let FsEntry { name, metadata } = match entry {
            Ok(entry) if entry.is_special() => continue,
            Ok(entry) => entry,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Entry removed between readdir and stat
                debug!(dir = %path.display(), "Skipping vanished entry: {}", e);
                continue;
            }
            Err(e) => return failed(NodeError::new(path, DirOp::List, e)),
        };

        let child_path = path.join(&name);
        if metadata.is_dir() {
            contents.children.push(DirectoryNode::new(child_path, metadata));
        } else {
            contents.leaves.push(Leaf::new(child_path, metadata));
        }
    }

    trace!(
        path = %path.display(),
        dirs = contents.children.len(),
        leaves = contents.leaves.len(),
        "Listed directory"
    );
    contents
}

fn failed(error: NodeError) -> Contents {
    if error.is_not_found() {
        // Common on live filesystems: the directory went away mid-walk
        debug!("{}", error);
    } else {
        warn!("{}", error);
    }
    Contents::failed(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{EntryType, Metadata};
    use crate::walker::queue::WorkQueue;
    use std::io;
    use std::path::{Path, PathBuf};

    /// Flat fake: every directory `d<n>` under root holds one file
    struct FanOut {
        dirs: usize,
        fail: Option<&'static str>,
    }

    impl FileSystem for FanOut {
        type ReadDir = std::vec::IntoIter<io::Result<FsEntry>>;

        fn stat(&self, _path: &Path) -> io::Result<Metadata> {
            Ok(Metadata::new(EntryType::Directory, 0))
        }

        fn open_dir(&self, path: &Path) -> io::Result<Self::ReadDir> {
            if Some(path.to_str().unwrap_or_default()) == self.fail {
                return Err(io::Error::from(io::ErrorKind::PermissionDenied));
            }
            let entries = if path == Path::new("root") {
                let mut v: Vec<_> = (0..self.dirs)
                    .map(|i| Ok(FsEntry::new(format!("d{}", i), Metadata::new(EntryType::Directory, 0))))
                    .collect();
                v.push(Ok(FsEntry::new(".", Metadata::new(EntryType::Directory, 0))));
                v.push(Err(io::Error::from(io::ErrorKind::NotFound)));
                v
            } else {
                vec![Ok(FsEntry::new("f", Metadata::new(EntryType::File, 3)))]
            };
            Ok(entries.into_iter())
        }
    }

    fn root() -> DirectoryNode {
        DirectoryNode::new(PathBuf::from("root"), Metadata::new(EntryType::Directory, 0))
    }

    #[test]
    fn test_zero_capacity_processes_everything_inline() {
        let fs = FanOut { dirs: 3, fail: None };
        let queue = WorkQueue::new(0);
        let stop = StopSignal::new();
        let pending = AtomicUsize::new(1);
        let ctx = WalkContext {
            fs: &fs,
            queue: queue.sender(),
            stop: &stop,
            pending: &pending,
        };

        let dir = root();
        traverse(&dir, &ctx);

        assert_eq!(dir.children().len(), 3);
        assert!(dir.leaves().is_empty());
        assert!(dir.children().iter().all(|c| c.is_listed() && c.leaves().len() == 1));
        assert_eq!(dir.total_length(), 7);
        assert_eq!(pending.load(Ordering::SeqCst), 1);
        assert_eq!(queue.stats().inline_count(), 3);
    }

    #[test]
    fn test_children_counted_when_queued() {
        let fs = FanOut { dirs: 2, fail: None };
        let queue = WorkQueue::new(8);
        let stop = StopSignal::new();
        let pending = AtomicUsize::new(1);
        let ctx = WalkContext {
            fs: &fs,
            queue: queue.sender(),
            stop: &stop,
            pending: &pending,
        };

        let dir = root();
        traverse(&dir, &ctx);

        assert_eq!(pending.load(Ordering::SeqCst), 3);
        assert_eq!(queue.len(), 2);
        assert!(dir.children().iter().all(|c| !c.is_listed()));
    }

    #[test]
    fn test_open_failure_recorded_on_node() {
        let fs = FanOut { dirs: 2, fail: Some("root/d1") };
        let queue = WorkQueue::new(0);
        let stop = StopSignal::new();
        let pending = AtomicUsize::new(1);
        let ctx = WalkContext {
            fs: &fs,
            queue: queue.sender(),
            stop: &stop,
            pending: &pending,
        };

        let dir = root();
        traverse(&dir, &ctx);

        let errs = dir.errors();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].op, DirOp::Open);
        assert!(errs[0].is_permission_denied());
        assert_eq!(dir.children()[0].leaves().len(), 1);
        assert!(dir.children()[1].leaves().is_empty());
    }

    #[test]
    fn test_stop_abandons_remaining_children() {
        let fs = FanOut { dirs: 2, fail: None };
        let queue = WorkQueue::new(0);
        let stop = StopSignal::new();
        stop.fire();
        let pending = AtomicUsize::new(1);
        let ctx = WalkContext {
            fs: &fs,
            queue: queue.sender(),
            stop: &stop,
            pending: &pending,
        };

        let dir = root();
        traverse(&dir, &ctx);

        assert_eq!(dir.children().len(), 2);
        assert!(dir.children().iter().all(|c| !c.is_listed()));
    }
}
