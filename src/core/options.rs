//! Per-package analysis options declared by the recipe.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::sca::GeneratorKind;

/// Switches that suppress parts of the generated manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PackageOptions {
    /// Suppress every `provides` contribution.
    pub no_provides: bool,
    /// Suppress every `runtime` contribution.
    pub no_depends: bool,
    /// Suppress `cmd:` capabilities in `provides`.
    pub no_commands: bool,
    /// Generators skipped for this package.
    pub disabled_generators: BTreeSet<GeneratorKind>,
}

impl PackageOptions {
    pub fn is_disabled(&self, kind: GeneratorKind) -> bool {
        self.disabled_generators.contains(&kind)
    }

    pub fn disable(mut self, kind: GeneratorKind) -> Self {
        self.disabled_generators.insert(kind);
        self
    }
}
