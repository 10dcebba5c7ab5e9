//! Classification of package paths by directory convention.

use std::fmt;
use std::sync::Arc;

use crate::config::{PathConfig, SegmentRuleConfig};
use crate::util::parent;

/// Predicate over one directory segment; a match makes a library location
/// private.
#[derive(Clone)]
pub enum SegmentRule {
    Exact(String),
    Prefix(String),
    Custom(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl SegmentRule {
    pub fn matches(&self, segment: &str) -> bool {
        match self {
            SegmentRule::Exact(name) => segment == name,
            SegmentRule::Prefix(prefix) => segment.starts_with(prefix.as_str()),
            SegmentRule::Custom(f) => f(segment),
        }
    }
}

impl fmt::Debug for SegmentRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentRule::Exact(name) => f.debug_tuple("Exact").field(name).finish(),
            SegmentRule::Prefix(prefix) => f.debug_tuple("Prefix").field(prefix).finish(),
            SegmentRule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<&SegmentRuleConfig> for SegmentRule {
    fn from(config: &SegmentRuleConfig) -> Self {
        match config {
            SegmentRuleConfig::Exact(name) => SegmentRule::Exact(name.clone()),
            SegmentRuleConfig::Prefix(prefix) => SegmentRule::Prefix(prefix.clone()),
        }
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Decides whether a file sits in a public library, executable or
/// pkg-config directory.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    lib_dirs: Vec<Vec<String>>,
    bin_dirs: Vec<String>,
    pkgconfig_dirs: Vec<String>,
    rules: Vec<SegmentRule>,
}

impl Default for PathClassifier {
    fn default() -> Self {
        Self::from_config(&PathConfig::default())
    }
}

impl PathClassifier {
    pub fn from_config(config: &PathConfig) -> Self {
        let normalize = |dir: &String| segments(dir).join("/");
        Self {
            lib_dirs: config
                .lib_dirs
                .iter()
                .map(|dir| segments(dir).into_iter().map(str::to_string).collect())
                .collect(),
            bin_dirs: config.bin_dirs.iter().map(normalize).collect(),
            pkgconfig_dirs: config.pkgconfig_dirs.iter().map(normalize).collect(),
            rules: config.private_segments.iter().map(SegmentRule::from).collect(),
        }
    }

    pub fn with_segment_rule(mut self, rule: SegmentRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add an arbitrary predicate; segments it accepts are private.
    pub fn with_rule<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.with_segment_rule(SegmentRule::Custom(Arc::new(f)))
    }

    /// Whether a file at `path` is a publicly linkable library location.
    pub fn is_library_location(&self, path: &str) -> bool {
        let dir = segments(parent(path));
        let under_lib_dir = self.lib_dirs.iter().any(|lib| {
            dir.len() >= lib.len() && dir.iter().zip(lib).all(|(a, b)| *a == b.as_str())
        });

        under_lib_dir && !dir.iter().any(|seg| self.rules.iter().any(|r| r.matches(seg)))
    }

    /// Whether the direct parent of `path` is an executable directory.
    pub fn is_bin_location(&self, path: &str) -> bool {
        let dir = parent(path);
        self.bin_dirs.iter().any(|bin| bin == dir)
    }

    /// Whether the direct parent of `path` is a canonical pkg-config directory.
    pub fn is_pkgconfig_location(&self, path: &str) -> bool {
        let dir = parent(path);
        self.pkgconfig_dirs.iter().any(|pc| pc == dir)
    }
}
