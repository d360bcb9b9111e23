//! Design unit handling
//!
//! A design is drawn in its own units; every exporter converts to
//! millimetres through [`DesignUnits::mm_per_unit`].

use serde::{Deserialize, Serialize};

/// Millimetres per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Unit a design's coordinates are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DesignUnits {
    /// One unit is one millimetre
    #[default]
    Millimeters,
    /// One unit is one inch
    Inches,
    /// One unit is the given number of millimetres
    Custom(f64),
}

impl DesignUnits {
    /// Scale factor from design units to millimetres
    pub fn mm_per_unit(&self) -> f64 {
        match self {
            Self::Millimeters => 1.0,
            Self::Inches => MM_PER_INCH,
            Self::Custom(scale) => *scale,
        }
    }

    /// Whether the scale factor is usable (finite and positive)
    pub fn is_valid(&self) -> bool {
        let scale = self.mm_per_unit();
        scale.is_finite() && scale > 0.0
    }
}
