//! Export orchestrator.

use std::path::Path;
use std::sync::Arc;

use fabkit_core::{export_event_bus, ExportEventBus, ExportResult};
use fabkit_geometry::Design;

use crate::config::ExportConfig;
use crate::job::{ExportJob, JobHandle};
use crate::source::ExportSource;

/// Starts export jobs and publishes their events on one bus
///
/// Jobs started from the same exporter are independent; they share only
/// the bus and whatever read-only sources the caller passes in.
#[derive(Debug, Clone)]
pub struct Exporter {
    bus: Arc<ExportEventBus>,
}

impl Exporter {
    /// Exporter with a private event bus
    pub fn new() -> Self {
        Self::with_event_bus(Arc::new(ExportEventBus::new()))
    }

    pub fn with_event_bus(bus: Arc<ExportEventBus>) -> Self {
        Self { bus }
    }

    /// Exporter publishing on the process-wide bus
    pub fn global() -> Self {
        Self::with_event_bus(export_event_bus())
    }

    pub fn event_bus(&self) -> &Arc<ExportEventBus> {
        &self.bus
    }

    /// Validate a request without starting it
    pub fn prepare(
        &self,
        source: impl Into<ExportSource>,
        destination: impl AsRef<Path>,
        config: ExportConfig,
    ) -> ExportResult<ExportJob> {
        ExportJob::prepare(source, destination, config, self.bus.clone())
    }

    /// Validate a request and start its worker
    ///
    /// Rejections (`UnsupportedFormat`, `InvalidConfiguration`) are
    /// returned here and no worker is started. Every other failure is
    /// reported through the returned handle.
    pub fn start_export(
        &self,
        source: impl Into<ExportSource>,
        destination: impl AsRef<Path>,
        config: ExportConfig,
    ) -> ExportResult<JobHandle> {
        let job = self.prepare(source, destination, config).inspect_err(|err| {
            tracing::warn!(error = %err, "export rejected");
        })?;
        job.spawn()
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Export a design through the process-wide exporter
pub fn export(
    design: Arc<Design>,
    destination: impl AsRef<Path>,
    config: ExportConfig,
) -> ExportResult<JobHandle> {
    Exporter::global().start_export(design, destination, config)
}
