//! Format drivers
//!
//! One driver per (source, output kind) pair, looked up in [`DRIVERS`].
//! Every driver is a fixed sequence of stages. Before each stage it checks
//! the soft token through [`StageContext::checkpoint`]; long stages receive
//! the hard token and return `Interrupted` from inside their loops. The
//! artifact is written to a temporary file and only committed after the
//! last stage succeeded.

mod field;
mod graph;
mod mesh;
mod raster;
mod vector;

use std::path::Path;

use fabkit_core::{
    CancelTokens, CancellationToken, ExportEvent, ExportEventBus, ExportResult, JobId,
    OutputKind, ProgressChannel, PROGRESS_COMPLETE,
};

use crate::config::ExportConfig;
use crate::source::{ExportSource, SourceKind};
use crate::writer::{AtomicFile, CommitGate};

/// Driver entry point
pub type DriverFn = fn(&StageContext<'_>, &ExportSource, &ExportConfig) -> ExportResult<()>;

/// One row of the driver table
#[derive(Debug, Clone, Copy)]
pub struct Driver {
    pub source: SourceKind,
    pub kind: OutputKind,
    pub name: &'static str,
    pub run: DriverFn,
}

/// Every supported (source, kind) pair
pub const DRIVERS: &[Driver] = &[
    Driver {
        source: SourceKind::Design,
        kind: OutputKind::RasterImage,
        name: "design-raster",
        run: raster::run_design,
    },
    Driver {
        source: SourceKind::Design,
        kind: OutputKind::VectorOutline,
        name: "design-outline",
        run: vector::run_design,
    },
    Driver {
        source: SourceKind::Design,
        kind: OutputKind::Mesh,
        name: "design-mesh",
        run: mesh::run_design,
    },
    Driver {
        source: SourceKind::Design,
        kind: OutputKind::RawField,
        name: "design-field",
        run: field::run_design,
    },
    Driver {
        source: SourceKind::Design,
        kind: OutputKind::GraphDump,
        name: "design-graph",
        run: graph::run_design,
    },
    Driver {
        source: SourceKind::Field,
        kind: OutputKind::RasterImage,
        name: "field-raster",
        run: raster::run_field,
    },
    Driver {
        source: SourceKind::Field,
        kind: OutputKind::Mesh,
        name: "field-mesh",
        run: mesh::run_field,
    },
    Driver {
        source: SourceKind::Field,
        kind: OutputKind::RawField,
        name: "field-field",
        run: field::run_field,
    },
];

/// Find the driver for a source and output kind
pub fn lookup(source: SourceKind, kind: OutputKind) -> Option<&'static Driver> {
    DRIVERS
        .iter()
        .find(|driver| driver.source == source && driver.kind == kind)
}

/// Progress after `step` of three equal steps for item `index` of `count`
///
/// Stays below 100 so that only a committed artifact reports completion.
pub(crate) fn stage_share(index: usize, count: usize, step: usize) -> u8 {
    let count = count.max(1);
    let value = (99 * index + 33 * step) / count;
    value.min(usize::from(PROGRESS_COMPLETE) - 1) as u8
}

/// Everything a driver may touch while it runs
pub struct StageContext<'a> {
    job: JobId,
    destination: &'a Path,
    tokens: &'a CancelTokens,
    progress: &'a ProgressChannel,
    gate: &'a CommitGate,
    bus: &'a ExportEventBus,
}

impl<'a> StageContext<'a> {
    pub fn new(
        job: JobId,
        destination: &'a Path,
        tokens: &'a CancelTokens,
        progress: &'a ProgressChannel,
        gate: &'a CommitGate,
        bus: &'a ExportEventBus,
    ) -> Self {
        Self {
            job,
            destination,
            tokens,
            progress,
            gate,
            bus,
        }
    }

    pub fn job(&self) -> JobId {
        self.job
    }

    pub fn destination(&self) -> &Path {
        self.destination
    }

    /// Token threaded into long-running engine calls
    pub fn hard(&self) -> &CancellationToken {
        self.tokens.hard()
    }

    /// Stage boundary: fail with `Cancelled` once the soft token is set
    pub fn checkpoint(&self) -> ExportResult<()> {
        self.tokens.soft().check()?;
        Ok(())
    }

    /// Advance progress and announce it
    ///
    /// Completion is never reported once a token is set.
    pub fn report(&self, percent: u8) {
        if percent >= PROGRESS_COMPLETE && self.tokens.is_cancelled() {
            return;
        }
        if let Some(percent) = self.progress.report(percent) {
            tracing::debug!(job_id = %self.job.short(), percent, "progress");
            self.bus
                .publish(ExportEvent::Progress {
                    job: self.job,
                    percent,
                })
                .ok();
        }
    }

    /// Open the temporary output for this job's destination
    pub fn create_output(&self) -> ExportResult<AtomicFile> {
        self.checkpoint()?;
        AtomicFile::create(self.destination)
    }

    /// Rename the artifact into place and report completion
    pub fn commit(&self, file: AtomicFile) -> ExportResult<()> {
        self.gate.commit(self.tokens, file)?;
        tracing::debug!(job_id = %self.job.short(), destination = %self.destination.display(), "artifact committed");
        self.report(PROGRESS_COMPLETE);
        Ok(())
    }
}
