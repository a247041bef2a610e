//! In-memory directory tree
//!
//! A walk produces a tree of two node kinds:
//!
//! ```text
//! DirectoryNode ──┬── leaves:   [Leaf, Leaf, ...]
//!                 ├── children: [DirectoryNode, ...]
//!                 └── error:    Option<NodeError>
//! ```
//!
//! A `DirectoryNode` is a cheap handle. Its contents live in a write-once
//! cell filled by the one worker that lists the directory; until then (or
//! if it never happens) the node reads as empty.

use crate::error::NodeError;
use crate::fs::Metadata;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::warn;

/// A non-directory entry
#[derive(Debug, Clone)]
pub struct Leaf {
    path: PathBuf,
    name: OsString,
    metadata: Metadata,
}

impl Leaf {
    pub(crate) fn new(path: PathBuf, metadata: Metadata) -> Self {
        let name = base_name(&path);
        Self {
            path,
            name,
            metadata,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &OsStr {
        &self.name
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// Everything a directory listing produced
#[derive(Debug, Default)]
pub(crate) struct Contents {
    pub children: Vec<DirectoryNode>,
    pub leaves: Vec<Leaf>,
    pub error: Option<NodeError>,
}

impl Contents {
    pub fn failed(error: NodeError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
struct DirInner {
    path: PathBuf,
    name: OsString,
    metadata: Metadata,
    contents: OnceLock<Contents>,
}

/// A directory entry and everything listed beneath it
#[derive(Debug, Clone)]
pub struct DirectoryNode {
    inner: Arc<DirInner>,
}

impl DirectoryNode {
    pub(crate) fn new(path: PathBuf, metadata: Metadata) -> Self {
        let name = base_name(&path);
        Self {
            inner: Arc::new(DirInner {
                path,
                name,
                metadata,
                contents: OnceLock::new(),
            }),
        }
    }

    /// Store the listing result. Only the first call has any effect.
    pub(crate) fn publish(&self, contents: Contents) {
        if self.inner.contents.set(contents).is_err() {
            warn!(path = %self.inner.path.display(), "Directory contents already published");
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn name(&self) -> &OsStr {
        &self.inner.name
    }

    pub fn metadata(&self) -> &Metadata {
        &self.inner.metadata
    }

    /// Whether a traversal step ever ran for this directory
    pub fn is_listed(&self) -> bool {
        self.inner.contents.get().is_some()
    }

    /// Child directories, in listing order
    pub fn children(&self) -> &[DirectoryNode] {
        self.inner
            .contents
            .get()
            .map(|c| c.children.as_slice())
            .unwrap_or(&[])
    }

    /// Non-directory entries, in listing order
    pub fn leaves(&self) -> &[Leaf] {
        self.inner
            .contents
            .get()
            .map(|c| c.leaves.as_slice())
            .unwrap_or(&[])
    }

    /// The failure recorded while listing this directory, if any
    pub fn error(&self) -> Option<&NodeError> {
        self.inner.contents.get().and_then(|c| c.error.as_ref())
    }

    /// This node's error followed by every descendant's, depth-first
    pub fn errors(&self) -> Vec<&NodeError> {
        self.preorder().filter_map(DirectoryNode::error).collect()
    }

    /// Number of nodes in this subtree, counting this one
    pub fn total_length(&self) -> usize {
        self.preorder().map(|dir| 1 + dir.leaves().len()).sum()
    }

    /// All nodes in this subtree: self, own leaves, then each child flattened
    pub fn flatten(&self) -> Vec<NodeRef<'_>> {
        let mut nodes = Vec::with_capacity(1 + self.leaves().len() + self.children().len());
        for dir in self.preorder() {
            nodes.push(NodeRef::Directory(dir));
            nodes.extend(dir.leaves().iter().map(NodeRef::Leaf));
        }
        nodes
    }

    /// Directories of this subtree in pre-order, without recursion
    fn preorder(&self) -> impl Iterator<Item = &DirectoryNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let dir = stack.pop()?;
            stack.extend(dir.children().iter().rev());
            Some(dir)
        })
    }
}

impl Drop for DirInner {
    // Unlink deep chains one level at a time instead of recursing
    fn drop(&mut self) {
        let mut stack = match self.contents.take() {
            Some(contents) => contents.children,
            None => return,
        };
        while let Some(node) = stack.pop() {
            if let Ok(mut inner) = Arc::try_unwrap(node.inner) {
                if let Some(contents) = inner.contents.take() {
                    stack.extend(contents.children);
                }
            }
        }
    }
}

/// Borrowed view of either node kind
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Directory(&'a DirectoryNode),
    Leaf(&'a Leaf),
}

impl<'a> NodeRef<'a> {
    pub fn path(&self) -> &'a Path {
        match self {
            NodeRef::Directory(d) => d.path(),
            NodeRef::Leaf(l) => l.path(),
        }
    }

    pub fn name(&self) -> &'a OsStr {
        match self {
            NodeRef::Directory(d) => d.name(),
            NodeRef::Leaf(l) => l.name(),
        }
    }

    pub fn metadata(&self) -> &'a Metadata {
        match self {
            NodeRef::Directory(d) => d.metadata(),
            NodeRef::Leaf(l) => l.metadata(),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, NodeRef::Directory(_))
    }
}

/// Last path component, or the whole path for roots like "/" or "."
fn base_name(path: &Path) -> OsString {
    path.file_name()
        .map(OsStr::to_os_string)
        .unwrap_or_else(|| path.as_os_str().to_os_string())
}
