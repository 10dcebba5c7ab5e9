//! The three-category dependency manifest.

use serde::{Deserialize, Serialize};

use crate::core::specifier::Specifier;
use crate::util::dedup;

/// Runtime requirements, provided capabilities and vendored facts of one
/// package, each an ordered list of specifier strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependencies {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub runtime: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub vendored: Vec<String>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.runtime.is_empty() && self.provides.is_empty() && self.vendored.is_empty()
    }

    pub fn add_runtime(&mut self, spec: &Specifier) {
        self.runtime.push(spec.to_string());
    }

    /// Append to provides unless the same entry is already vendored.
    pub fn add_provides(&mut self, spec: &Specifier) {
        let spec = spec.to_string();
        if !self.vendored.contains(&spec) {
            self.provides.push(spec);
        }
    }

    /// Append to vendored, withdrawing the entry from provides.
    pub fn add_vendored(&mut self, spec: &Specifier) {
        let spec = spec.to_string();
        self.provides.retain(|p| *p != spec);
        self.vendored.push(spec);
    }

    /// Like [`Self::add_vendored`], unless already present.
    pub fn add_vendored_once(&mut self, spec: &Specifier) -> bool {
        let spec = spec.to_string();
        self.provides.retain(|p| *p != spec);
        if self.vendored.contains(&spec) {
            return false;
        }
        self.vendored.push(spec);
        true
    }

    /// Remove duplicates from every category, keeping first occurrences.
    pub fn dedup(&mut self) {
        self.runtime = dedup(std::mem::take(&mut self.runtime));
        self.provides = dedup(std::mem::take(&mut self.provides));
        self.vendored = dedup(std::mem::take(&mut self.vendored));
    }

    /// Put author-declared `base` entries ahead of the generated ones, then
    /// dedup.
    pub fn merge_base(&mut self, base: &Dependencies) {
        fn merged(base: &[String], generated: Vec<String>) -> Vec<String> {
            dedup(base.iter().cloned().chain(generated))
        }

        self.runtime = merged(&base.runtime, std::mem::take(&mut self.runtime));
        self.provides = merged(&base.provides, std::mem::take(&mut self.provides));
        self.vendored = merged(&base.vendored, std::mem::take(&mut self.vendored));
        let vendored = &self.vendored;
        self.provides.retain(|p| !vendored.contains(p));
    }
}
