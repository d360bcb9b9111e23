//! Export lifecycle events.

use std::path::PathBuf;

use crate::job::{JobId, JobOutcome, OutputKind};

/// Events published while export jobs run
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    /// A worker picked the job up
    Started {
        /// Job identifier.
        job: JobId,
        /// Artifact kind being produced.
        kind: OutputKind,
        /// Destination path.
        destination: PathBuf,
    },
    /// The job's progress cell advanced
    Progress {
        /// Job identifier.
        job: JobId,
        /// New percentage.
        percent: u8,
    },
    /// The job reached its terminal status
    Finished {
        /// Job identifier.
        job: JobId,
        /// Terminal status.
        outcome: JobOutcome,
    },
}

impl ExportEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            ExportEvent::Started { .. } | ExportEvent::Finished { .. } => EventCategory::Lifecycle,
            ExportEvent::Progress { .. } => EventCategory::Progress,
        }
    }

    /// The job this event belongs to
    pub fn job(&self) -> JobId {
        match self {
            ExportEvent::Started { job, .. }
            | ExportEvent::Progress { job, .. }
            | ExportEvent::Finished { job, .. } => *job,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            ExportEvent::Started {
                job,
                kind,
                destination,
            } => format!("{} started: {} -> {}", job, kind, destination.display()),
            ExportEvent::Progress { job, percent } => format!("{} at {}%", job, percent),
            ExportEvent::Finished { job, outcome } => {
                format!("{} finished: {}", job, outcome.description())
            }
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// Start and finish notifications.
    Lifecycle,
    /// Progress updates.
    Progress,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Lifecycle => write!(f, "Lifecycle"),
            EventCategory::Progress => write!(f, "Progress"),
        }
    }
}
