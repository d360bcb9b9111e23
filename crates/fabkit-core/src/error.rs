//! Error handling for FabKit
//!
//! Provides error types for every layer of the export pipeline:
//! - Geometry errors (expression evaluation, regions, field computation)
//! - Configuration errors (missing, unknown or out-of-range options)
//! - Export errors (the terminal failure taxonomy reported by a job)
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Geometry engine error type
///
/// Raised by shape evaluation, region construction and the field
/// algorithms. `Interrupted` is the cancellation indicator returned by
/// any stage that observed its hard token.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Shape bounds are infinite, NaN or inverted
    #[error("Degenerate bounds for shape '{shape}': {reason}")]
    DegenerateBounds {
        /// Name of the failing shape.
        shape: String,
        /// Why the bounds were rejected.
        reason: String,
    },

    /// Expression could not be evaluated
    #[error("Failed to evaluate shape '{shape}': {reason}")]
    Evaluation {
        /// Name of the failing shape.
        shape: String,
        /// Why evaluation failed.
        reason: String,
    },

    /// Region parameters were rejected
    #[error("Invalid region: {reason}")]
    InvalidRegion {
        /// Why the region was rejected.
        reason: String,
    },

    /// An artifact could not be encoded or decoded
    #[error("Encoding error: {reason}")]
    Encoding {
        /// The encoder or decoder message.
        reason: String,
    },

    /// The reader or writer behind an encoder failed
    ///
    /// Carries no path; the caller that owns the stream attaches one.
    #[error("Stream error: {reason}")]
    Stream {
        /// The underlying I/O message.
        reason: String,
    },

    /// File system failure while reading or writing an artifact
    #[error("I/O error on {path}: {reason}")]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying I/O message.
        reason: String,
    },

    /// Computation stopped early because the hard token was set
    #[error("Computation interrupted")]
    Interrupted,
}

impl GeometryError {
    /// Wrap an I/O error together with the path it occurred on
    pub fn io(path: impl AsRef<Path>, err: std::io::Error) -> Self {
        GeometryError::Io {
            path: path.as_ref().to_path_buf(),
            reason: err.to_string(),
        }
    }

    /// Wrap an I/O error raised by an encoder's reader or writer
    pub fn stream(err: std::io::Error) -> Self {
        GeometryError::Stream {
            reason: err.to_string(),
        }
    }

    /// Attach `path` to a [`GeometryError::Stream`] failure, turning it into
    /// [`GeometryError::Io`]; other errors pass through
    pub fn at_path(self, path: impl AsRef<Path>) -> Self {
        match self {
            GeometryError::Stream { reason } => GeometryError::Io {
                path: path.as_ref().to_path_buf(),
                reason,
            },
            other => other,
        }
    }
}

/// Configuration error type
///
/// Represents problems with an export configuration. These are always
/// detected before a worker is started.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required option was not supplied
    #[error("Missing required option '{0}'")]
    MissingOption(String),

    /// An option name is not recognized
    #[error("Unknown option '{0}'")]
    UnknownOption(String),

    /// A numeric option is outside its valid range
    #[error("Option '{option}' out of range: {value} ({reason})")]
    OutOfRange {
        /// The option name.
        option: String,
        /// The rejected value, formatted.
        value: String,
        /// The constraint that was violated.
        reason: String,
    },

    /// An option value could not be parsed
    #[error("Invalid value for '{option}': {reason}")]
    InvalidValue {
        /// The option name.
        option: String,
        /// Why the value could not be used.
        reason: String,
    },

    /// A configuration file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// The configuration file type is not supported
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Main error type for export jobs
///
/// `InvalidConfiguration` and `UnsupportedFormat` are returned
/// synchronously by `start_export`. The remaining variants are terminal
/// job outcomes. `Cancelled` is not a failure; it is carried here so that
/// drivers can unwind with `?` when they observe a token.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    /// The configuration is missing a required option or holds a bad value
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// No driver exists for the destination suffix
    #[error("Unsupported format: '{extension}'")]
    UnsupportedFormat {
        /// The suffix (possibly empty) of the destination path.
        extension: String,
    },

    /// A shape failed to evaluate or produced degenerate bounds
    #[error(transparent)]
    Geometry(GeometryError),

    /// The destination could not be written
    #[error("I/O error on {path}: {reason}")]
    Io {
        /// The path being written.
        path: PathBuf,
        /// The underlying I/O message.
        reason: String,
    },

    /// The job observed a cancellation token
    #[error("Export cancelled")]
    Cancelled,

    /// The worker panicked, in a stage or in an event handler it ran
    #[error("Export worker panicked: {reason}")]
    WorkerPanic {
        /// The panic payload, when it was a string.
        reason: String,
    },
}

impl ExportError {
    /// Wrap an I/O error together with the path it occurred on
    pub fn io(path: impl AsRef<Path>, err: std::io::Error) -> Self {
        ExportError::Io {
            path: path.as_ref().to_path_buf(),
            reason: err.to_string(),
        }
    }

    /// Build a [`ExportError::WorkerPanic`] from a caught panic payload
    pub fn worker_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        ExportError::WorkerPanic { reason }
    }

    /// Check if this is the cancellation status rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExportError::Cancelled)
    }

    /// Check if this error is raised before a worker starts
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ExportError::InvalidConfiguration(_) | ExportError::UnsupportedFormat { .. }
        )
    }
}

impl From<GeometryError> for ExportError {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::Interrupted => ExportError::Cancelled,
            GeometryError::Io { path, reason } => ExportError::Io { path, reason },
            other => ExportError::Geometry(other),
        }
    }
}

/// Result type for geometry engine operations
pub type GeometryResult<T> = std::result::Result<T, GeometryError>;

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type for export operations
pub type ExportResult<T> = std::result::Result<T, ExportError>;
