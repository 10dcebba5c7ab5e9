//! Intermediate findings produced while scanning a package.

use serde::{Deserialize, Serialize};

use crate::core::specifier::Specifier;
use crate::core::version::soname_major;

/// A shared object that declares a soname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SonameRecord {
    /// Package-relative path of the object
    pub path: String,
    pub soname: String,
    /// Parsed major version, absent without a numeric suffix
    pub major: Option<String>,
}

impl SonameRecord {
    pub fn new(path: impl Into<String>, soname: impl Into<String>) -> Self {
        let soname = soname.into();
        let major = soname_major(&soname).map(str::to_string);
        Self {
            path: path.into(),
            soname,
            major,
        }
    }

    /// `so:<soname>[=<major>]`
    pub fn specifier(&self) -> Specifier {
        Specifier::so(self.soname.clone()).with_optional_version(self.major.clone())
    }
}

/// A parsed pkg-config descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkgConfigRecord {
    /// Logical library name (descriptor file stem)
    pub name: String,
    pub version: String,
    /// Package-relative path of the descriptor
    pub path: String,
    /// Module names from `Requires`
    pub requires: Vec<String>,
    /// Library names from `-l` flags in `Libs`
    pub libs: Vec<String>,
    /// Expanded `libdir` variable, package-relative
    pub libdir: Option<String>,
}

impl PkgConfigRecord {
    /// `pc:<name>=<version>`
    pub fn specifier(&self) -> Specifier {
        Specifier::pc(self.name.clone()).with_version(self.version.clone())
    }
}
