//! Job vocabulary shared by the export pipeline and its observers.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ExportError;

/// Unique identifier of one export job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying uuid
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// First eight hex digits, used for thread names and log lines
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Job({})", self.short())
    }
}

/// The closed set of artifact kinds a job can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// Raster image (`.png`)
    RasterImage,
    /// Vector outline (`.svg`)
    VectorOutline,
    /// Triangulated mesh (`.stl`)
    Mesh,
    /// Serialized distance field (`.asdf`)
    RawField,
    /// Computation-graph dump (`.dot`)
    GraphDump,
}

/// Recognised destination suffixes, lower case
pub const SUFFIXES: &[(&str, OutputKind)] = &[
    ("png", OutputKind::RasterImage),
    ("svg", OutputKind::VectorOutline),
    ("stl", OutputKind::Mesh),
    ("asdf", OutputKind::RawField),
    ("dot", OutputKind::GraphDump),
];

impl OutputKind {
    /// All kinds in suffix-table order
    pub fn all() -> impl Iterator<Item = OutputKind> {
        SUFFIXES.iter().map(|(_, kind)| *kind)
    }

    /// Look a suffix up, ignoring case
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.to_ascii_lowercase();
        SUFFIXES
            .iter()
            .find(|(suffix, _)| *suffix == extension)
            .map(|(_, kind)| *kind)
    }

    /// Infer the kind from a destination path
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(extension).ok_or_else(|| ExportError::UnsupportedFormat {
            extension: extension.to_string(),
        })
    }

    /// Canonical suffix for this kind
    pub fn extension(&self) -> &'static str {
        match self {
            OutputKind::RasterImage => "png",
            OutputKind::VectorOutline => "svg",
            OutputKind::Mesh => "stl",
            OutputKind::RawField => "asdf",
            OutputKind::GraphDump => "dot",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputKind::RasterImage => "raster image",
            OutputKind::VectorOutline => "vector outline",
            OutputKind::Mesh => "mesh",
            OutputKind::RawField => "raw field",
            OutputKind::GraphDump => "graph dump",
        };
        f.write_str(name)
    }
}

/// Worker lifetime state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JobState {
    /// Validated but no worker yet
    #[default]
    Created,
    /// Worker executing the driver
    Running,
    /// Terminated by a cancellation token
    Cancelled,
    /// Artifact committed
    Completed,
    /// Stopped by a geometry or I/O error
    Failed,
}

impl JobState {
    /// True for the three end states
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Cancelled | JobState::Completed | JobState::Failed
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Terminal status delivered exactly once per job
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// The artifact was written
    Completed,
    /// A token was observed before the artifact was committed
    Cancelled,
    /// A stage failed; carries the cause
    Failed(ExportError),
}

impl JobOutcome {
    /// Build the outcome for a driver result
    pub fn from_result(result: Result<(), ExportError>) -> Self {
        match result {
            Ok(()) => JobOutcome::Completed,
            Err(ExportError::Cancelled) => JobOutcome::Cancelled,
            Err(err) => JobOutcome::Failed(err),
        }
    }

    /// The state a job enters with this outcome
    pub fn state(&self) -> JobState {
        match self {
            JobOutcome::Completed => JobState::Completed,
            JobOutcome::Cancelled => JobState::Cancelled,
            JobOutcome::Failed(_) => JobState::Failed,
        }
    }

    /// Whether the artifact exists
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Completed)
    }

    /// The failure cause, if any
    pub fn error(&self) -> Option<&ExportError> {
        match self {
            JobOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// One-line summary for status bars
    pub fn description(&self) -> String {
        match self {
            JobOutcome::Completed => "Export complete".to_string(),
            JobOutcome::Cancelled => "Export cancelled".to_string(),
            JobOutcome::Failed(err) => format!("Export failed: {}", err),
        }
    }
}
