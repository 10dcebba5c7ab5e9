//! Core data types for package analysis.
//!
//! The dependency manifest and its specifier grammar are the only contract
//! with the surrounding packaging system; everything else here feeds them.

pub mod dependencies;
pub mod options;
pub mod records;
pub mod specifier;
pub mod version;

pub use dependencies::Dependencies;
pub use options::PackageOptions;
pub use records::{PkgConfigRecord, SonameRecord};
pub use specifier::{SpecKind, Specifier};
