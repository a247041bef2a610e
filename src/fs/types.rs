//! Filesystem entry types
//!
//! Plain value snapshots of what a stat call returned. They are captured
//! once, when an entry is discovered, and never refreshed.

use chrono::{DateTime, Utc};
use std::ffi::OsString;

/// Type of filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EntryType {
    /// Regular file
    File = 0,
    /// Directory
    Directory = 1,
    /// Symbolic link
    Symlink = 2,
    /// Block device
    BlockDevice = 3,
    /// Character device
    CharDevice = 4,
    /// Named pipe (FIFO)
    Fifo = 5,
    /// Unix socket
    Socket = 6,
    /// Unknown type
    Unknown = 255,
}

impl EntryType {
    /// Convert from Unix mode bits
    pub fn from_mode(mode: u32) -> Self {
        match mode & 0o170000 {
            0o100000 => EntryType::File,        // S_IFREG
            0o040000 => EntryType::Directory,   // S_IFDIR
            0o120000 => EntryType::Symlink,     // S_IFLNK
            0o060000 => EntryType::BlockDevice, // S_IFBLK
            0o020000 => EntryType::CharDevice,  // S_IFCHR
            0o010000 => EntryType::Fifo,        // S_IFIFO
            0o140000 => EntryType::Socket,      // S_IFSOCK
            _ => EntryType::Unknown,
        }
    }

    /// Convert from a std file type (does not follow symlinks)
    pub fn from_file_type(ft: std::fs::FileType) -> Self {
        if ft.is_symlink() {
            return EntryType::Symlink;
        }
        if ft.is_dir() {
            return EntryType::Directory;
        }
        if ft.is_file() {
            return EntryType::File;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            if ft.is_block_device() {
                return EntryType::BlockDevice;
            }
            if ft.is_char_device() {
                return EntryType::CharDevice;
            }
            if ft.is_fifo() {
                return EntryType::Fifo;
            }
            if ft.is_socket() {
                return EntryType::Socket;
            }
        }

        EntryType::Unknown
    }

    /// Check if this is a regular file
    pub fn is_file(&self) -> bool {
        *self == EntryType::File
    }

    /// Check if this is a directory
    pub fn is_dir(&self) -> bool {
        *self == EntryType::Directory
    }

    /// Check if this is a symbolic link
    pub fn is_symlink(&self) -> bool {
        *self == EntryType::Symlink
    }
}

/// File permissions (Unix mode bits without type)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions(pub u32);

impl Permissions {
    /// Create from full mode (strips type bits)
    pub fn from_mode(mode: u32) -> Self {
        Self(mode & 0o7777)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn owner_read(&self) -> bool {
        self.0 & 0o400 != 0
    }

    pub fn owner_exec(&self) -> bool {
        self.0 & 0o100 != 0
    }
}

/// Metadata snapshot for a filesystem entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Entry type, as seen without following symlinks
    pub entry_type: EntryType,

    /// Size in bytes
    pub size: u64,

    /// Inode number
    pub inode: u64,

    /// Number of hard links
    pub nlink: u64,

    /// User ID
    pub uid: u32,

    /// Group ID
    pub gid: u32,

    /// File mode (type + permissions)
    pub mode: u32,

    /// Last access time (Unix timestamp)
    pub atime: Option<i64>,

    /// Last modification time (Unix timestamp)
    pub mtime: Option<i64>,

    /// Status change time (Unix timestamp)
    pub ctime: Option<i64>,
}

impl Metadata {
    /// Minimal snapshot carrying only a type and size
    pub fn new(entry_type: EntryType, size: u64) -> Self {
        Self {
            entry_type,
            size,
            inode: 0,
            nlink: 1,
            uid: 0,
            gid: 0,
            mode: 0,
            atime: None,
            mtime: None,
            ctime: None,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type.is_dir()
    }

    /// Permission bits from mode
    pub fn permissions(&self) -> Permissions {
        Permissions::from_mode(self.mode)
    }

    pub fn mtime_utc(&self) -> Option<DateTime<Utc>> {
        self.mtime.and_then(|t| DateTime::from_timestamp(t, 0))
    }

    pub fn atime_utc(&self) -> Option<DateTime<Utc>> {
        self.atime.and_then(|t| DateTime::from_timestamp(t, 0))
    }
}

impl From<&std::fs::Metadata> for Metadata {
    #[cfg(unix)]
    fn from(md: &std::fs::Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;

        Self {
            entry_type: EntryType::from_mode(md.mode()),
            size: md.size(),
            inode: md.ino(),
            nlink: md.nlink(),
            uid: md.uid(),
            gid: md.gid(),
            mode: md.mode(),
            atime: Some(md.atime()),
            mtime: Some(md.mtime()),
            ctime: Some(md.ctime()),
        }
    }

    #[cfg(not(unix))]
    fn from(md: &std::fs::Metadata) -> Self {
        let secs = |t: std::io::Result<std::time::SystemTime>| {
            t.ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64)
        };

        Self {
            atime: secs(md.accessed()),
            mtime: secs(md.modified()),
            ..Self::new(EntryType::from_file_type(md.file_type()), md.len())
        }
    }
}

/// A single entry returned from a directory listing
#[derive(Debug, Clone)]
pub struct FsEntry {
    /// Entry name (not full path)
    pub name: OsString,

    /// Snapshot taken without following symlinks
    pub metadata: Metadata,
}

impl FsEntry {
    pub fn new(name: impl Into<OsString>, metadata: Metadata) -> Self {
        Self {
            name: name.into(),
            metadata,
        }
    }

    /// Check if this is "." or ".."
    pub fn is_special(&self) -> bool {
        self.name == "." || self.name == ".."
    }
}
