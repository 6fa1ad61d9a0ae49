use std::path::PathBuf;

use dirspace_core::{
    DEFAULT_PUBLISH_THRESHOLD, Entity, EntityKind, ScanConfig, ScanSnapshot, ScanStats, SkipRules,
};

#[test]
fn test_entity_kind_discrimination() {
    assert!(EntityKind::File.is_file());
    assert!(!EntityKind::File.is_dir());
    assert!(EntityKind::Directory.is_dir());
    assert!(!EntityKind::Directory.is_file());
}

#[test]
fn test_nested_entity_structure() {
    let mut root = Entity::new_directory("root", "/r");

    let mut dir1 = Entity::new_directory("dir1", "/r/dir1");
    dir1.children.push(Entity::new_file("file1.txt", "/r/dir1/file1.txt", 512));
    dir1.size = 512;

    let mut dir2 = Entity::new_directory("dir2", "/r/dir2");
    dir2.children.push(Entity::new_file("file2.txt", "/r/dir2/file2.txt", 1024));
    dir2.size = 1024;

    root.children.push(dir1);
    root.children.push(dir2);
    root.size = 1536;

    assert_eq!(root.node_count(), 5);
    assert_eq!(root.child_count(), 2);

    // dir2 holds the larger file, so it sorts first
    root.sort_children_by_size();
    assert_eq!(root.children[0].name.as_str(), "dir2");
    assert_eq!(root.children[1].name.as_str(), "dir1");
}

#[test]
fn test_stats_accumulation_matches_records() {
    let mut stats = ScanStats::new();
    stats.record(EntityKind::Directory, 0);
    stats.record(EntityKind::Directory, 0);
    stats.record(EntityKind::File, 100);
    stats.record(EntityKind::File, 50);

    assert_eq!(stats.entity_count, 4);
    assert_eq!(stats.folder_count, 2);
    assert_eq!(stats.file_count, 2);
    assert_eq!(stats.total_size, 150);
}

#[test]
fn test_scan_config_builder() {
    let config = ScanConfig::builder()
        .root("/test/path")
        .include_hidden(false)
        .build()
        .unwrap();

    assert_eq!(config.root, PathBuf::from("/test/path"));
    assert!(!config.include_hidden);
    assert_eq!(config.publish_threshold, DEFAULT_PUBLISH_THRESHOLD);

    assert!(config.should_skip_hidden(".cache"));
    assert!(!config.should_skip_hidden("cache"));
}

#[test]
fn test_skip_rules_predicate() {
    let rules = SkipRules::new(|path| {
        path.extension().map(|e| e == "app").unwrap_or(false)
    });

    assert!(rules.matches(std::path::Path::new("/Applications/Safari.app")));
    assert!(!rules.matches(std::path::Path::new("/Applications/readme.txt")));
}

#[test]
fn test_snapshot_serialization_round_trip() {
    let mut tree = Entity::new_directory("root", "/r");
    tree.children.push(Entity::new_file("f", "/r/f", 42));
    tree.size = 42;
    let mut stats = ScanStats::new();
    stats.record(EntityKind::File, 42);

    let snapshot = ScanSnapshot::capture(&tree, &stats);
    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: ScanSnapshot = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.total_size(), 42);
    assert_eq!(parsed.stats.file_count, 1);
    assert_eq!(parsed.tree.children[0].name.as_str(), "f");
}
