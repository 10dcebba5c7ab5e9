//! Software composition analysis for built packages.
//!
//! Given the installed file tree of a package, `pkgsca` derives what the
//! package needs at runtime, what it provides to others, and which
//! libraries it carries privately:
//!
//! ```no_run
//! use std::sync::Arc;
//! use pkgsca::{analyze, AnalysisContext, Dependencies, DirFs, PackageBundle};
//!
//! let fs = DirFs::new("/tmp/pkg/libcap");
//! let handle = PackageBundle::new("libcap", "2.69-r0", Arc::new(fs));
//! let mut deps = Dependencies::new();
//! analyze(&AnalysisContext::default(), &handle, &mut deps)?;
//! deps.dedup();
//! # Ok::<(), pkgsca::ScaError>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod formats;
pub mod fs;
pub mod handle;
pub mod logging;
pub mod sca;
pub mod util;

#[doc(hidden)]
pub mod test_support;

pub use crate::config::ScaConfig;
pub use crate::core::{Dependencies, PackageOptions, SpecKind, Specifier};
pub use crate::error::{Result, ScaError};
pub use crate::fs::{DirFs, MemFs, PackageFs};
pub use crate::handle::{PackageBundle, PackageHandle};
pub use crate::sca::{analyze, AnalysisContext, Analyzer, CancellationToken, GeneratorKind};
