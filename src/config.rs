//! Configuration for package analysis.
//!
//! Every field has a default, so a JSON document only needs to name what it
//! overrides.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScaError};

/// Master configuration carried by an analysis context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaConfig {
    /// Read limits.
    pub io: IoConfig,
    /// Directory layout conventions.
    pub paths: PathConfig,
}

impl ScaConfig {
    /// Load a configuration from JSON, filling missing fields with defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ScaError::Config(format!("invalid config: {e}")))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ScaError::Config(format!("cannot serialize config: {e}")))
    }
}

/// Bounds on how much of a file is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// Largest object read whole for ELF parsing; bigger files are skipped.
    pub max_file_size: u64,
    /// Prefix read to classify content as text or binary.
    pub max_sniff_size: usize,
    /// Longest interpreter line considered.
    pub max_shebang_line: usize,
    /// Total bytes `${var}` expansion may produce for one `.pc` descriptor.
    pub max_pkgconfig_expansion: usize,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            max_file_size: 256 * 1024 * 1024,
            max_sniff_size: 4096,
            max_shebang_line: 256,
            max_pkgconfig_expansion: 1024 * 1024,
        }
    }
}

/// Segment predicate as it appears in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "match", content = "value", rename_all = "snake_case")]
pub enum SegmentRuleConfig {
    Exact(String),
    Prefix(String),
}

/// Canonical directory layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Public shared library directories (prefix match).
    pub lib_dirs: Vec<String>,
    /// Executable directories (direct parent match).
    pub bin_dirs: Vec<String>,
    /// pkg-config descriptor directories (direct parent match).
    pub pkgconfig_dirs: Vec<String>,
    /// Directory segments that make a library location private.
    pub private_segments: Vec<SegmentRuleConfig>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            lib_dirs: strings(&[
                "lib",
                "lib64",
                "usr/lib",
                "usr/lib64",
                "usr/local/lib",
                "usr/local/lib64",
            ]),
            bin_dirs: strings(&[
                "bin",
                "sbin",
                "usr/bin",
                "usr/sbin",
                "usr/local/bin",
                "usr/local/sbin",
            ]),
            pkgconfig_dirs: strings(&[
                "usr/lib/pkgconfig",
                "usr/lib64/pkgconfig",
                "usr/share/pkgconfig",
                "usr/local/lib/pkgconfig",
                "usr/local/share/pkgconfig",
            ]),
            private_segments: vec![SegmentRuleConfig::Prefix("libexec".to_string())],
        }
    }
}
