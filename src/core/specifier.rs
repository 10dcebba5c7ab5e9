//! Dependency specifiers: `<kind>:<identifier>[=<version>]`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScaError;

/// Namespace of a specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpecKind {
    /// Shared object, keyed by soname
    #[serde(rename = "so")]
    SharedObject,
    /// Executable command on `PATH`
    #[serde(rename = "cmd")]
    Command,
    /// pkg-config module
    #[serde(rename = "pc")]
    PkgConfig,
}

impl SpecKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            SpecKind::SharedObject => "so",
            SpecKind::Command => "cmd",
            SpecKind::PkgConfig => "pc",
        }
    }
}

impl fmt::Display for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for SpecKind {
    type Err = ScaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "so" => Ok(SpecKind::SharedObject),
            "cmd" => Ok(SpecKind::Command),
            "pc" => Ok(SpecKind::PkgConfig),
            _ => Err(ScaError::InvalidSpecifier {
                input: s.to_string(),
                reason: "unknown kind",
            }),
        }
    }
}

/// One manifest entry in typed form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Specifier {
    pub kind: SpecKind,
    pub name: String,
    pub version: Option<String>,
}

impl Specifier {
    pub fn new(kind: SpecKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            version: None,
        }
    }

    pub fn so(name: impl Into<String>) -> Self {
        Self::new(SpecKind::SharedObject, name)
    }

    pub fn cmd(name: impl Into<String>) -> Self {
        Self::new(SpecKind::Command, name)
    }

    pub fn pc(name: impl Into<String>) -> Self {
        Self::new(SpecKind::PkgConfig, name)
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Attach a version only when one is known.
    pub fn with_optional_version(mut self, version: Option<impl Into<String>>) -> Self {
        self.version = version.map(Into::into);
        self
    }

    /// The specifier without its version, as used for requirements.
    pub fn unversioned(&self) -> Self {
        Self::new(self.kind, self.name.clone())
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)?;
        if let Some(version) = &self.version {
            write!(f, "={version}")?;
        }
        Ok(())
    }
}

impl FromStr for Specifier {
    type Err = ScaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ScaError::InvalidSpecifier {
            input: s.to_string(),
            reason,
        };

        let (kind, rest) = s.split_once(':').ok_or_else(|| invalid("missing kind"))?;
        let kind = kind.parse::<SpecKind>().map_err(|_| invalid("unknown kind"))?;

        let (name, version) = match rest.split_once('=') {
            Some((name, version)) => (name, Some(version)),
            None => (rest, None),
        };

        if name.is_empty() {
            return Err(invalid("empty identifier"));
        }
        if version.is_some_and(str::is_empty) {
            return Err(invalid("empty version"));
        }

        Ok(Specifier {
            kind,
            name: name.to_string(),
            version: version.map(str::to_string),
        })
    }
}
