//! Scan configuration types.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Default snapshot publication threshold: 10 MiB of file bytes.
pub const DEFAULT_PUBLISH_THRESHOLD: u64 = 10 * 1024 * 1024;

/// Pluggable skip predicate for the walker.
///
/// Entries whose path matches are omitted from the scan entirely, together
/// with their contents. This is where platform-specific rules live (opaque
/// bundle directories, `.DS_Store`, editor droppings) so the engine itself
/// stays portable.
#[derive(Clone)]
pub struct SkipRules(Arc<dyn Fn(&Path) -> bool + Send + Sync>);

impl SkipRules {
    /// Build skip rules from a predicate.
    pub fn new(predicate: impl Fn(&Path) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Build skip rules that exclude entries by file name.
    pub fn names(names: Vec<String>) -> Self {
        Self::new(move |path| {
            path.file_name()
                .map(|n| names.iter().any(|s| n == s.as_str()))
                .unwrap_or(false)
        })
    }

    /// Check whether a path should be skipped.
    pub fn matches(&self, path: &Path) -> bool {
        (self.0)(path)
    }
}

impl fmt::Debug for SkipRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SkipRules(..)")
    }
}

/// Configuration for one scan.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root path to scan.
    pub root: PathBuf,

    /// Include hidden entries (names starting with `.`).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,

    /// Cumulative file bytes between intermediate snapshot publications.
    #[builder(default = "DEFAULT_PUBLISH_THRESHOLD")]
    #[serde(default = "default_publish_threshold")]
    pub publish_threshold: u64,

    /// Optional skip predicate applied to every enumerated entry.
    #[builder(default)]
    #[serde(skip)]
    pub skip: Option<SkipRules>,
}

fn default_true() -> bool {
    true
}

fn default_publish_threshold() -> u64 {
    DEFAULT_PUBLISH_THRESHOLD
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for scanning a path with defaults.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include_hidden: true,
            publish_threshold: DEFAULT_PUBLISH_THRESHOLD,
            skip: None,
        }
    }

    /// Check if a hidden entry name should be excluded.
    pub fn should_skip_hidden(&self, name: &str) -> bool {
        !self.include_hidden && name.starts_with('.')
    }

    /// Check if the skip rules exclude a path.
    pub fn should_skip(&self, path: &Path) -> bool {
        self.skip.as_ref().is_some_and(|rules| rules.matches(path))
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
