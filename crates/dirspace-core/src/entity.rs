//! File and folder entity types.

use std::path::PathBuf;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Kind of a scanned entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Regular file (leaf node).
    File,
    /// Directory with aggregated size.
    Directory,
}

impl EntityKind {
    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, EntityKind::Directory)
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, EntityKind::File)
    }
}

/// A single node in the scanned tree.
///
/// For files, `size` is the byte count reported at enumeration time. For
/// directories, `size` is the sum of all descendant file sizes and only
/// grows while a scan is running.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Last path component.
    pub name: CompactString,

    /// Absolute path, unique among the children of any one parent.
    pub path: PathBuf,

    /// File or directory. Immutable once created.
    pub kind: EntityKind,

    /// Size in bytes (aggregate for directories).
    pub size: u64,

    /// Child entities, kept in insertion order. Always empty for files.
    pub children: Vec<Entity>,
}

impl Entity {
    /// Create a new file entity.
    pub fn new_file(name: impl Into<CompactString>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: EntityKind::File,
            size,
            children: Vec::new(),
        }
    }

    /// Create a new empty directory entity.
    pub fn new_directory(name: impl Into<CompactString>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: EntityKind::Directory,
            size: 0,
            children: Vec::new(),
        }
    }

    /// Check if this entity is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Check if this entity is a file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Number of nodes in this subtree, including self.
    pub fn node_count(&self) -> u64 {
        1 + self.children.iter().map(Entity::node_count).sum::<u64>()
    }

    /// Sort children by size in descending order, recursively.
    ///
    /// Display ordering is a read-time concern; the tree itself keeps
    /// children in insertion order while a scan is running.
    pub fn sort_children_by_size(&mut self) {
        self.children.sort_by(|a, b| b.size.cmp(&a.size));
        for child in &mut self.children {
            child.sort_children_by_size();
        }
    }

    /// Find a direct child by absolute path.
    pub fn child_by_path(&self, path: &std::path::Path) -> Option<&Entity> {
        self.children.iter().find(|c| c.path == path)
    }
}
