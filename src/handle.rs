//! The package handle: everything analysis may learn about one built package.

use std::sync::Arc;

use crate::core::{Dependencies, PackageOptions};
use crate::error::{Result, ScaError};
use crate::fs::PackageFs;

/// Read-only view of a built package handed to the generators.
pub trait PackageHandle: Send + Sync {
    fn package_name(&self) -> &str;

    fn version(&self) -> &str;

    /// This package's name followed by the names sharing its build origin.
    fn relative_names(&self) -> Vec<String>;

    /// View over the whole package tree.
    fn filesystem(&self) -> Result<Arc<dyn PackageFs>>;

    /// View over the tree of a relative, as named by `relative_names`.
    fn filesystem_for_relative(&self, name: &str) -> Result<Arc<dyn PackageFs>>;

    fn options(&self) -> &PackageOptions;

    /// Author-declared dependencies; analysis never mutates them.
    fn base_dependencies(&self) -> &Dependencies;
}

/// Handle over one package view plus the views of its relatives.
#[derive(Clone)]
pub struct PackageBundle {
    name: String,
    version: String,
    fs: Arc<dyn PackageFs>,
    relatives: Vec<(String, Arc<dyn PackageFs>)>,
    options: PackageOptions,
    base: Dependencies,
}

impl PackageBundle {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        fs: Arc<dyn PackageFs>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            fs,
            relatives: Vec::new(),
            options: PackageOptions::default(),
            base: Dependencies::default(),
        }
    }

    /// Register a relative view; several names may share one view.
    pub fn with_relative(mut self, name: impl Into<String>, fs: Arc<dyn PackageFs>) -> Self {
        self.relatives.push((name.into(), fs));
        self
    }

    pub fn with_options(mut self, options: PackageOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_base_dependencies(mut self, base: Dependencies) -> Self {
        self.base = base;
        self
    }
}

impl std::fmt::Debug for PackageBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageBundle")
            .field("name", &self.name)
            .field("version", &self.version)
            .field(
                "relatives",
                &self.relatives.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .field("options", &self.options)
            .finish()
    }
}

impl PackageHandle for PackageBundle {
    fn package_name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn relative_names(&self) -> Vec<String> {
        std::iter::once(self.name.clone())
            .chain(self.relatives.iter().map(|(name, _)| name.clone()))
            .collect()
    }

    fn filesystem(&self) -> Result<Arc<dyn PackageFs>> {
        Ok(Arc::clone(&self.fs))
    }

    fn filesystem_for_relative(&self, name: &str) -> Result<Arc<dyn PackageFs>> {
        if name == self.name {
            return self.filesystem();
        }
        self.relatives
            .iter()
            .find(|(relative, _)| relative == name)
            .map(|(_, fs)| Arc::clone(fs))
            .ok_or_else(|| ScaError::Handle(format!("no filesystem for relative {name}")))
    }

    fn options(&self) -> &PackageOptions {
        &self.options
    }

    fn base_dependencies(&self) -> &Dependencies {
        &self.base
    }
}
