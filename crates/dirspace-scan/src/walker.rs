//! Streaming filesystem enumeration.

use std::path::PathBuf;

use jwalk::{Parallelism, WalkDir};
use tracing::{trace, warn};

use dirspace_core::{EntityKind, ScanConfig, SkipRules};

use crate::cancel::CancelFlag;

/// One enumerated filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkRecord {
    /// Absolute path of the entry.
    pub path: PathBuf,
    /// File or directory.
    pub kind: EntityKind,
    /// Byte size for files; always 0 for directories.
    pub size: u64,
}

/// Lazy sequence of `(path, kind, size)` records under a root.
///
/// The walker applies the inclusion policy from `ScanConfig`: hidden
/// entries are excluded when `include_hidden` is false, entries matching
/// the skip rules are omitted together with their contents, and files with
/// size 0 never produce a record. Symlinks are not followed and produce no
/// records, so a symlink cycle on disk cannot turn the walk into a loop.
///
/// Enumeration order is unspecified; consumers must not rely on parents
/// arriving before their children. Per-entry stat failures are logged and
/// skipped. The cancellation flag is checked before every yielded record
/// and the sequence ends promptly once it is set.
pub struct PathWalker {
    entries: jwalk::DirEntryIter<((), ())>,
    skip: Option<SkipRules>,
    cancel: CancelFlag,
}

impl PathWalker {
    /// Start enumerating under `config.root`.
    pub fn new(config: &ScanConfig, cancel: CancelFlag) -> Self {
        let mut walker = WalkDir::new(&config.root)
            .parallelism(Parallelism::Serial)
            .skip_hidden(!config.include_hidden)
            .follow_links(false)
            .min_depth(1);

        if let Some(rules) = config.skip.clone() {
            // Skipped directories are pruned here so their contents are
            // never read at all; the entries themselves are dropped in
            // `next`.
            walker = walker.process_read_dir(move |_depth, _path, _state, children| {
                for entry in children.iter_mut().flatten() {
                    if rules.matches(&entry.path()) {
                        entry.read_children_path = None;
                    }
                }
            });
        }

        Self {
            entries: walker.into_iter(),
            skip: config.skip.clone(),
            cancel,
        }
    }
}

impl Iterator for PathWalker {
    type Item = WalkRecord;

    fn next(&mut self) -> Option<WalkRecord> {
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }

            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().map(|p| p.display().to_string()).unwrap_or_default();
                    warn!(path = %path, error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            let path = entry.path();
            if self.skip.as_ref().is_some_and(|rules| rules.matches(&path)) {
                continue;
            }

            let file_type = entry.file_type();
            if file_type.is_dir() {
                return Some(WalkRecord {
                    path,
                    kind: EntityKind::Directory,
                    size: 0,
                });
            }
            if !file_type.is_file() {
                // Symlinks, sockets, devices: invisible to the model.
                trace!(path = %path.display(), "skipping non-regular entry");
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping entry without metadata");
                    continue;
                }
            };

            let size = metadata.len();
            if size == 0 {
                // Empty files are invisible to the model by design.
                trace!(path = %path.display(), "skipping zero-byte file");
                continue;
            }

            return Some(WalkRecord {
                path,
                kind: EntityKind::File,
                size,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("dir1")).unwrap();
        fs::create_dir(root.join("dir1/subdir")).unwrap();
        fs::create_dir(root.join("dir2")).unwrap();

        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join("dir1/file2.txt"), "world world world").unwrap();
        fs::write(root.join("dir1/subdir/file3.txt"), "test").unwrap();
        fs::write(root.join("dir2/empty.txt"), "").unwrap();

        temp
    }

    fn collect(config: &ScanConfig) -> Vec<WalkRecord> {
        PathWalker::new(config, CancelFlag::new()).collect()
    }

    #[test]
    fn test_walks_files_and_directories() {
        let temp = create_test_tree();
        let records = collect(&ScanConfig::new(temp.path()));

        let names: HashSet<String> = records
            .iter()
            .map(|r| r.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert!(names.contains("dir1"));
        assert!(names.contains("dir2"));
        assert!(names.contains("subdir"));
        assert!(names.contains("file1.txt"));
        assert!(names.contains("file2.txt"));
        assert!(names.contains("file3.txt"));
    }

    #[test]
    fn test_zero_byte_files_are_dropped() {
        let temp = create_test_tree();
        let records = collect(&ScanConfig::new(temp.path()));

        assert!(!records.iter().any(|r| r.path.ends_with("empty.txt")));
        // The directory holding only an empty file still gets a record
        assert!(records.iter().any(|r| r.path.ends_with("dir2") && r.kind.is_dir()));
    }

    #[test]
    fn test_directory_records_have_zero_size() {
        let temp = create_test_tree();
        let records = collect(&ScanConfig::new(temp.path()));

        for record in records.iter().filter(|r| r.kind.is_dir()) {
            assert_eq!(record.size, 0);
        }
    }

    #[test]
    fn test_file_sizes_reported() {
        let temp = create_test_tree();
        let records = collect(&ScanConfig::new(temp.path()));

        let file1 = records.iter().find(|r| r.path.ends_with("file1.txt")).unwrap();
        assert_eq!(file1.kind, EntityKind::File);
        assert_eq!(file1.size, 5);
    }

    #[test]
    fn test_hidden_entries_excluded() {
        let temp = create_test_tree();
        fs::create_dir(temp.path().join(".hidden")).unwrap();
        fs::write(temp.path().join(".hidden/inner.txt"), "secret").unwrap();
        fs::write(temp.path().join(".dotfile"), "data").unwrap();

        let with_hidden = collect(&ScanConfig::new(temp.path()));
        assert!(with_hidden.iter().any(|r| r.path.ends_with(".dotfile")));
        assert!(with_hidden.iter().any(|r| r.path.ends_with("inner.txt")));

        let config = ScanConfig::builder()
            .root(temp.path())
            .include_hidden(false)
            .build()
            .unwrap();
        let without_hidden = collect(&config);
        assert!(!without_hidden.iter().any(|r| r.path.ends_with(".dotfile")));
        assert!(!without_hidden.iter().any(|r| r.path.ends_with(".hidden")));
        assert!(!without_hidden.iter().any(|r| r.path.ends_with("inner.txt")));
    }

    #[test]
    fn test_skip_rules_prune_subtree() {
        let temp = create_test_tree();
        let config = ScanConfig::builder()
            .root(temp.path())
            .skip(Some(SkipRules::names(vec!["dir1".to_string()])))
            .build()
            .unwrap();

        let records = collect(&config);
        assert!(!records.iter().any(|r| r.path.ends_with("dir1")));
        assert!(!records.iter().any(|r| r.path.ends_with("file2.txt")));
        assert!(!records.iter().any(|r| r.path.ends_with("subdir")));
        assert!(records.iter().any(|r| r.path.ends_with("file1.txt")));
    }

    #[test]
    fn test_cancellation_stops_enumeration() {
        let temp = create_test_tree();
        let cancel = CancelFlag::new();
        let config = ScanConfig::new(temp.path());
        let mut walker = PathWalker::new(&config, cancel.clone());

        assert!(walker.next().is_some());
        cancel.cancel();
        assert!(walker.next().is_none());
        assert!(walker.next().is_none());
    }

    #[test]
    fn test_cancelled_before_first_record() {
        let temp = create_test_tree();
        let cancel = CancelFlag::new();
        cancel.cancel();

        let config = ScanConfig::new(temp.path());
        assert_eq!(PathWalker::new(&config, cancel).count(), 0);
    }
}
