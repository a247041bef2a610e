//! `std::fs` backed filesystem

use super::types::{FsEntry, Metadata};
use super::FileSystem;
use std::fs;
use std::io;
use std::path::Path;

/// The local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    type ReadDir = LocalReadDir;

    fn stat(&self, path: &Path) -> io::Result<Metadata> {
        fs::metadata(path).map(|md| Metadata::from(&md))
    }

    fn open_dir(&self, path: &Path) -> io::Result<LocalReadDir> {
        fs::read_dir(path).map(|inner| LocalReadDir { inner })
    }
}

/// Directory iterator that snapshots each entry's metadata as it goes
pub struct LocalReadDir {
    inner: fs::ReadDir,
}

impl Iterator for LocalReadDir {
    type Item = io::Result<FsEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e)),
        };

        // DirEntry::metadata does not traverse symlinks
        Some(
            entry
                .metadata()
                .map(|md| FsEntry::new(entry.file_name(), Metadata::from(&md))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::EntryType;
    use tempfile::tempdir;

    #[test]
    fn test_stat_directory_and_missing() {
        let dir = tempdir().unwrap();
        let md = LocalFs.stat(dir.path()).unwrap();
        assert!(md.is_dir());

        let err = LocalFs.stat(&dir.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_open_dir_lists_entries() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let mut entries: Vec<FsEntry> = LocalFs
            .open_dir(dir.path())
            .unwrap()
            .collect::<io::Result<_>>()
            .unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "a.txt");
        assert_eq!(entries[0].metadata.entry_type, EntryType::File);
        assert_eq!(entries[0].metadata.size, 5);
        assert_eq!(entries[1].name, "sub");
        assert!(entries[1].metadata.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_dir_is_not_followed() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("real")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        let link = LocalFs
            .open_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap())
            .find(|e| e.name == "link")
            .unwrap();
        assert_eq!(link.metadata.entry_type, EntryType::Symlink);
    }
}
