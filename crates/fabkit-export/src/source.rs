//! What an export reads from.

use std::sync::Arc;

use fabkit_core::{ConfigError, ExportError, ExportResult};
use fabkit_geometry::{Design, Field, Shape};

/// Input of an export job
///
/// Both variants are shared read-only; several jobs may hold the same
/// design or field at once.
#[derive(Debug, Clone)]
pub enum ExportSource {
    Design(Arc<Design>),
    /// An already sampled field
    Field(Arc<Field>),
}

/// Source discriminant used to key the driver table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Design,
    Field,
}

impl ExportSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            ExportSource::Design(_) => SourceKind::Design,
            ExportSource::Field(_) => SourceKind::Field,
        }
    }

    pub fn design(&self) -> Option<&Design> {
        match self {
            ExportSource::Design(design) => Some(design),
            ExportSource::Field(_) => None,
        }
    }

    pub fn field(&self) -> Option<&Field> {
        match self {
            ExportSource::Field(field) => Some(field),
            ExportSource::Design(_) => None,
        }
    }

    pub(crate) fn require_design(&self) -> ExportResult<&Design> {
        self.design().ok_or_else(|| invalid_source("expected a design"))
    }

    pub(crate) fn require_field(&self) -> ExportResult<&Field> {
        self.field().ok_or_else(|| invalid_source("expected a field"))
    }

    /// The design's shapes combined into one
    pub(crate) fn require_combined_shape(&self) -> ExportResult<Shape> {
        self.require_design()?
            .shape()
            .ok_or_else(|| invalid_source("design has no shapes"))
    }
}

fn invalid_source(reason: &str) -> ExportError {
    ExportError::from(ConfigError::InvalidValue {
        option: "source".to_string(),
        reason: reason.to_string(),
    })
}

impl From<Design> for ExportSource {
    fn from(design: Design) -> Self {
        ExportSource::Design(Arc::new(design))
    }
}

impl From<Arc<Design>> for ExportSource {
    fn from(design: Arc<Design>) -> Self {
        ExportSource::Design(design)
    }
}

impl From<Field> for ExportSource {
    fn from(field: Field) -> Self {
        ExportSource::Field(Arc::new(field))
    }
}

impl From<Arc<Field>> for ExportSource {
    fn from(field: Arc<Field>) -> Self {
        ExportSource::Field(field)
    }
}
