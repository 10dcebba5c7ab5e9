//! Error types for package analysis.
//!
//! Soft failures (one unreadable file, a corrupt object) are logged and never
//! reach this type; everything here aborts the analysis of a package.

use thiserror::Error;

use crate::formats::elf::ElfError;

/// Main error type for SCA operations.
#[derive(Debug, Error)]
pub enum ScaError {
    /// The cancellation token was triggered
    #[error("Analysis cancelled")]
    Cancelled,

    /// The analysis deadline passed
    #[error("Analysis deadline exceeded after {elapsed_ms}ms")]
    DeadlineExceeded { elapsed_ms: u64 },

    /// Configuration could not be loaded or written
    #[error("Configuration error: {0}")]
    Config(String),

    /// The package handle could not provide what was asked of it
    #[error("Package handle error: {0}")]
    Handle(String),

    /// File I/O errors with the package-relative path
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A generator failed hard while processing `path`
    #[error("{generator} generator failed on {path}: {source}")]
    Generator {
        generator: &'static str,
        path: String,
        #[source]
        source: Box<ScaError>,
    },

    /// ELF reader errors
    #[error("ELF error: {0}")]
    Elf(#[from] ElfError),

    /// pkg-config descriptor errors
    #[error("pkg-config error: {0}")]
    PkgConfig(String),

    /// Malformed `<kind>:<identifier>[=<version>]` string
    #[error("Invalid specifier {input:?}: {reason}")]
    InvalidSpecifier { input: String, reason: &'static str },
}

/// Result type alias for SCA operations
pub type Result<T> = std::result::Result<T, ScaError>;

impl ScaError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        ScaError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for cancellation and deadline expiry, looking through the
    /// generator wrapper.
    pub fn is_cancellation(&self) -> bool {
        match self {
            ScaError::Cancelled | ScaError::DeadlineExceeded { .. } => true,
            ScaError::Generator { source, .. } => source.is_cancellation(),
            _ => false,
        }
    }

    /// Whether running the same analysis again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ScaError::Cancelled | ScaError::DeadlineExceeded { .. } | ScaError::Io { .. } => true,
            ScaError::Handle(_) => true,
            ScaError::Generator { source, .. } => source.is_retryable(),
            ScaError::Config(_)
            | ScaError::Elf(_)
            | ScaError::PkgConfig(_)
            | ScaError::InvalidSpecifier { .. } => false,
        }
    }
}
