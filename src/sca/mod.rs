//! Software composition analysis of built packages.
//!
//! An [`Analyzer`] runs an ordered list of generators over one package and
//! accumulates their findings in a [`Dependencies`] manifest. The built-in
//! generators run in a fixed order: ELF, pkg-config, shebang.

pub mod context;
pub mod elf;
pub mod paths;
pub mod pkgconfig;
pub mod shebang;
pub mod sniff;

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::core::Dependencies;
use crate::error::{Result, ScaError};
use crate::handle::PackageHandle;

pub use context::{AnalysisContext, CancellationToken};
pub use paths::{PathClassifier, SegmentRule};

/// Built-in generators, as named in package options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    Elf,
    PkgConfig,
    Shebang,
}

impl GeneratorKind {
    pub fn name(&self) -> &'static str {
        match self {
            GeneratorKind::Elf => "elf",
            GeneratorKind::PkgConfig => "pkgconfig",
            GeneratorKind::Shebang => "shebang",
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A hard failure inside a generator and the path being processed.
#[derive(Debug)]
pub struct GeneratorError {
    pub path: String,
    pub source: ScaError,
}

impl GeneratorError {
    pub fn new(path: impl Into<String>, source: ScaError) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}

/// Attach `path` to an error, for use with `map_err`.
pub fn at(path: &str) -> impl FnOnce(ScaError) -> GeneratorError + '_ {
    move |source| GeneratorError::new(path, source)
}

pub type GeneratorResult = std::result::Result<(), GeneratorError>;

/// Signature every generator implements.
pub type GeneratorFn =
    fn(&AnalysisContext, &dyn PackageHandle, &mut Dependencies) -> GeneratorResult;

#[derive(Clone)]
struct Generator {
    name: &'static str,
    kind: Option<GeneratorKind>,
    run: GeneratorFn,
}

/// Ordered generator list.
#[derive(Clone)]
pub struct Analyzer {
    generators: Vec<Generator>,
}

impl Default for Analyzer {
    fn default() -> Self {
        let builtin = |kind: GeneratorKind, run: GeneratorFn| Generator {
            name: kind.name(),
            kind: Some(kind),
            run,
        };
        Self {
            generators: vec![
                builtin(GeneratorKind::Elf, elf::generate),
                builtin(GeneratorKind::PkgConfig, pkgconfig::generate),
                builtin(GeneratorKind::Shebang, shebang::generate),
            ],
        }
    }
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("generators", &self.generator_names())
            .finish()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a generator after those already registered.
    pub fn with_generator(mut self, name: &'static str, run: GeneratorFn) -> Self {
        self.generators.push(Generator {
            name,
            kind: None,
            run,
        });
        self
    }

    pub fn generator_names(&self) -> Vec<&'static str> {
        self.generators.iter().map(|g| g.name).collect()
    }

    /// Run every enabled generator over `handle`, appending to `deps`.
    ///
    /// On error the manifest is partial and should be discarded.
    pub fn run(
        &self,
        ctx: &AnalysisContext,
        handle: &dyn PackageHandle,
        deps: &mut Dependencies,
    ) -> Result<()> {
        let span = info_span!(
            "analyze",
            package = %handle.package_name(),
            version = %handle.version()
        );
        let _guard = span.enter();

        ctx.checkpoint()?;

        let options = handle.options();
        for generator in &self.generators {
            if generator.kind.is_some_and(|kind| options.is_disabled(kind)) {
                debug!(generator = generator.name, "generator disabled for package");
                continue;
            }

            debug!(generator = generator.name, "running generator");
            (generator.run)(ctx, handle, deps).map_err(|e| ScaError::Generator {
                generator: generator.name,
                path: e.path,
                source: Box::new(e.source),
            })?;
        }

        info!(
            runtime = deps.runtime.len(),
            provides = deps.provides.len(),
            vendored = deps.vendored.len(),
            "analysis complete"
        );
        Ok(())
    }

    /// Analyze several packages in parallel, each into its own
    /// deduplicated manifest. Results keep the order of `handles`.
    pub fn analyze_packages(
        &self,
        ctx: &AnalysisContext,
        handles: &[&dyn PackageHandle],
    ) -> Vec<Result<Dependencies>> {
        handles
            .par_iter()
            .map(|handle| {
                let mut deps = Dependencies::new();
                self.run(ctx, *handle, &mut deps)?;
                deps.dedup();
                Ok(deps)
            })
            .collect()
    }
}

/// Run the built-in generators over `handle`, appending to `deps`.
pub fn analyze(
    ctx: &AnalysisContext,
    handle: &dyn PackageHandle,
    deps: &mut Dependencies,
) -> Result<()> {
    Analyzer::default().run(ctx, handle, deps)
}
