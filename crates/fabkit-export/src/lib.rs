//! # FabKit Export
//!
//! Background export of designs and sampled fields into fabrication
//! artifacts.
//!
//! ```text
//! Exporter::start_export(source, destination, config)
//!   -> validate suffix and options       (synchronous rejection)
//!   -> spawn one worker `export-<id>`
//!        driver stages: checkpoint -> engine call (hard token) -> progress
//!        encode into a temporary file, rename on success
//!   -> JobHandle: progress / cancel / wait / outcome
//! ```
//!
//! Progress and lifecycle events are also published on the exporter's
//! [`ExportEventBus`](fabkit_core::ExportEventBus).

pub mod config;
pub mod drivers;
pub mod exporter;
pub mod job;
pub mod source;
pub mod writer;

pub use config::{ExportConfig, StrokeScaling};
pub use drivers::{lookup, Driver, DRIVERS};
pub use exporter::{export, Exporter};
pub use job::{ExportJob, JobHandle};
pub use source::{ExportSource, SourceKind};
