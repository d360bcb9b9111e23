//! # FabKit
//!
//! Export pipeline for implicit-geometry CAD designs. Designs made of
//! signed-distance shapes are exported in the background to:
//! - raster images (`.png`)
//! - vector outlines (`.svg`)
//! - triangulated meshes (`.stl`)
//! - raw sampled fields (`.asdf`)
//! - computation-graph dumps (`.dot`)
//!
//! ## Architecture
//!
//! FabKit is organized as a workspace with multiple crates:
//!
//! 1. **fabkit-core** - Errors, cancellation tokens, progress, export events
//! 2. **fabkit-geometry** - Shapes, designs, regions, fields and encoders
//! 3. **fabkit-export** - Configuration, format drivers and background jobs
//! 4. **fabkit** - This facade
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use fabkit::{export, Design, ExportConfig, Expr, Shape};
//!
//! let design = Design::default().with_shape(Shape::new("disc", Expr::circle([0.0, 0.0], 5.0)));
//! let job = export(Arc::new(design), "disc.svg", ExportConfig::new().with_resolution(4.0))?;
//! println!("{}", job.wait().description());
//! # Ok::<(), fabkit::ExportError>(())
//! ```

pub use fabkit_core::{
    export_event_bus, CancelTokens, CancellationToken, ConfigError, DesignUnits, EventBusConfig,
    EventFilter, ExportError, ExportEvent, ExportEventBus, ExportResult, GeometryError, JobId,
    JobOutcome, JobState, OutputKind, ProgressChannel,
};
pub use fabkit_export::{
    export, ExportConfig, ExportJob, ExportSource, Exporter, JobHandle, StrokeScaling,
};
pub use fabkit_geometry::{compute_region, Bounds, Design, Expr, Field, Region, Shape};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
/// - Thread names, so `export-<job>` workers are identifiable
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
