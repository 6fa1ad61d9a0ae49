//! Incremental tree construction.

use std::ffi::OsStr;
use std::path::PathBuf;

use tracing::warn;

use dirspace_core::{Entity, EntityKind};

use crate::walker::WalkRecord;

/// Inserts walk records into an entity tree, materializing missing
/// ancestor directories on demand.
///
/// Records may arrive in any order: a deep file can be enumerated before,
/// after, or without any record for its ancestor directories. Each missing
/// intermediate directory is created with size 0 and filled in if its own
/// record arrives later. On every successful insertion the record's size
/// is added to every ancestor up to the root, so directory sizes stay
/// equal to the sum of their children at all times.
///
/// Insertion is idempotent with respect to node identity: a record whose
/// path is already present appends nothing and leaves all sizes unchanged.
/// Children are kept in insertion order; size ordering for display is a
/// read-time concern (`Entity::sort_children_by_size`).
#[derive(Debug)]
pub struct TreeBuilder {
    root_path: PathBuf,
}

impl TreeBuilder {
    /// Create a builder for records under `root_path`.
    ///
    /// A trailing separator on the root is harmless; relative paths are
    /// computed component-wise.
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
        }
    }

    /// Insert one record into the tree rooted at `root`.
    ///
    /// Returns `true` if a new node was appended. Records whose path falls
    /// outside the root are logged and dropped.
    pub fn insert(&self, root: &mut Entity, record: &WalkRecord) -> bool {
        let relative = match record.path.strip_prefix(&self.root_path) {
            Ok(relative) => relative,
            Err(_) => {
                warn!(
                    path = %record.path.display(),
                    root = %self.root_path.display(),
                    "record outside scan root, dropping"
                );
                return false;
            }
        };

        let components: Vec<&OsStr> = relative.iter().collect();
        if components.is_empty() {
            // The root itself is never inserted into its own tree.
            return false;
        }

        Self::insert_at(root, &components, record)
    }

    fn insert_at(parent: &mut Entity, components: &[&OsStr], record: &WalkRecord) -> bool {
        let inserted = if let [name] = components {
            if parent.children.iter().any(|c| c.path == record.path) {
                false
            } else {
                parent.children.push(Self::entity_from(record, name));
                true
            }
        } else {
            let name = components[0].to_string_lossy();
            let index = match parent
                .children
                .iter()
                .position(|c| c.is_dir() && c.name.as_str() == name.as_ref())
            {
                Some(index) => index,
                None => {
                    // Lazy materialization of a not-yet-enumerated ancestor.
                    let path = parent.path.join(components[0]);
                    parent.children.push(Entity::new_directory(name.as_ref(), path));
                    parent.children.len() - 1
                }
            };
            Self::insert_at(&mut parent.children[index], &components[1..], record)
        };

        if inserted {
            parent.size += record.size;
        }
        inserted
    }

    fn entity_from(record: &WalkRecord, name: &OsStr) -> Entity {
        let name = name.to_string_lossy();
        match record.kind {
            EntityKind::File => Entity::new_file(name.as_ref(), record.path.clone(), record.size),
            EntityKind::Directory => Entity::new_directory(name.as_ref(), record.path.clone()),
        }
    }
}
