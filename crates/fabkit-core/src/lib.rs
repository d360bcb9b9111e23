//! # FabKit Core
//!
//! Shared vocabulary for the export pipeline: the error taxonomy,
//! cancellation tokens, the progress channel, job identifiers and states,
//! design units and the export event bus.

pub mod cancel;
pub mod error;
pub mod event_bus;
pub mod job;
pub mod progress;
pub mod types;
pub mod units;

pub use cancel::{CancelTokens, CancellationToken};
pub use error::{
    ConfigError, ConfigResult, ExportError, ExportResult, GeometryError, GeometryResult,
};
pub use event_bus::{
    export_event_bus, EventBusConfig, EventCategory, EventFilter, ExportEvent, ExportEventBus,
    SubscriptionId,
};
pub use job::{JobId, JobOutcome, JobState, OutputKind, SUFFIXES};
pub use progress::{ProgressChannel, PROGRESS_COMPLETE};
pub use types::*;
pub use units::{DesignUnits, MM_PER_INCH};
