//! Sampling regions.
//!
//! A [`Region`] is an axis-aligned box plus a sampling density. Samples sit
//! at cell centres, so a region `n` cells wide has `n` samples along that
//! axis. A flat region has zero thickness and exactly one sample in z at
//! `z = 0`.

use fabkit_core::{GeometryError, GeometryResult};
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;

/// Upper limit on samples along one axis
pub const MAX_SAMPLES_PER_AXIS: usize = 8192;

/// Upper limit on samples in a whole region
pub const MAX_SAMPLES: usize = 1 << 26;

/// Axis-aligned sampling box in design units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub min: [f64; 3],
    pub max: [f64; 3],
    /// Samples per design unit
    pub scale: f64,
}

/// Build the region used to sample or render a shape
///
/// * `bounds` - shape or design bounds in design units
/// * `margin` - border added on each side, as a fraction of each axis' extent
/// * `mm_per_unit` - physical size of one design unit
/// * `resolution` - samples per millimetre
/// * `flatten` - collapse z to a zero-thickness slab at `z = 0`
pub fn compute_region(
    bounds: &Bounds,
    margin: f64,
    mm_per_unit: f64,
    resolution: f64,
    flatten: bool,
) -> GeometryResult<Region> {
    if !(resolution.is_finite() && resolution > 0.0) {
        return Err(invalid(format!("resolution must be > 0, got {}", resolution)));
    }
    if !(mm_per_unit.is_finite() && mm_per_unit > 0.0) {
        return Err(invalid(format!("unit scale must be > 0, got {}", mm_per_unit)));
    }
    if !(margin.is_finite() && margin >= 0.0) {
        return Err(invalid(format!("margin must be >= 0, got {}", margin)));
    }

    let axes: &[usize] = if flatten { &[0, 1] } else { &[0, 1, 2] };
    if let Some(reason) = bounds.degeneracy(axes) {
        return Err(invalid(reason));
    }

    let mut min = bounds.min;
    let mut max = bounds.max;
    for &axis in axes {
        let pad = bounds.extent(axis) * margin;
        min[axis] -= pad;
        max[axis] += pad;
    }
    if flatten {
        min[2] = 0.0;
        max[2] = 0.0;
    }

    let region = Region {
        min,
        max,
        scale: resolution * mm_per_unit,
    };
    if !region.scale.is_finite() {
        return Err(invalid("sampling scale overflowed".to_string()));
    }
    region.checked_dims()?;
    Ok(region)
}

fn invalid(reason: String) -> GeometryError {
    GeometryError::InvalidRegion { reason }
}

impl Region {
    /// Distance between samples in design units
    pub fn pitch(&self) -> f64 {
        1.0 / self.scale
    }

    pub fn is_flat(&self) -> bool {
        self.max[2] <= self.min[2]
    }

    pub fn extent(&self, axis: usize) -> f64 {
        self.max[axis] - self.min[axis]
    }

    /// Sample counts per axis; at least one along each axis
    pub fn dims(&self) -> [usize; 3] {
        let count = |axis: usize| {
            let n = (self.extent(axis) * self.scale).round();
            if n.is_finite() && n >= 1.0 {
                n as usize
            } else {
                1
            }
        };
        [count(0), count(1), count(2)]
    }

    /// Sample counts, rejecting regions too large to allocate
    pub fn checked_dims(&self) -> GeometryResult<[usize; 3]> {
        let dims = self.dims();
        if dims.iter().any(|&n| n > MAX_SAMPLES_PER_AXIS) {
            return Err(invalid(format!(
                "{}x{}x{} samples exceed the per-axis limit of {}",
                dims[0], dims[1], dims[2], MAX_SAMPLES_PER_AXIS
            )));
        }
        let total = dims[0] * dims[1] * dims[2];
        if total > MAX_SAMPLES {
            return Err(invalid(format!(
                "{} samples exceed the limit of {}",
                total, MAX_SAMPLES
            )));
        }
        Ok(dims)
    }

    /// Coordinate of sample `index` along `axis`
    pub fn sample(&self, axis: usize, index: usize, count: usize) -> f64 {
        if self.extent(axis) <= 0.0 {
            return self.min[axis];
        }
        let step = self.extent(axis) / count as f64;
        self.min[axis] + (index as f64 + 0.5) * step
    }

    /// Cell size along each axis; flat axes use the nominal pitch
    pub fn cell_size(&self, dims: [usize; 3]) -> [f64; 3] {
        let mut size = [self.pitch(); 3];
        for (axis, s) in size.iter_mut().enumerate() {
            if self.extent(axis) > 0.0 {
                *s = self.extent(axis) / dims[axis] as f64;
            }
        }
        size
    }

    /// Size in millimetres of the xy footprint
    pub fn footprint_mm(&self, mm_per_unit: f64) -> [f64; 2] {
        [self.extent(0) * mm_per_unit, self.extent(1) * mm_per_unit]
    }
}
