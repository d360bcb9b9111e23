//! Axis-aligned bounding boxes in design units.

use serde::{Deserialize, Serialize};

/// Axis-aligned box; unbounded axes use infinities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Bounds {
    /// Box covering all of space
    pub const INFINITE: Bounds = Bounds {
        min: [f64::NEG_INFINITY; 3],
        max: [f64::INFINITY; 3],
    };

    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// A 2D box, unbounded in z
    pub fn planar(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            min: [xmin, ymin, f64::NEG_INFINITY],
            max: [xmax, ymax, f64::INFINITY],
        }
    }

    pub fn extent(&self, axis: usize) -> f64 {
        self.max[axis] - self.min[axis]
    }

    /// Largest extent over the given axes
    pub fn max_extent(&self, axes: &[usize]) -> f64 {
        axes.iter()
            .map(|&a| self.extent(a))
            .fold(0.0, f64::max)
    }

    /// Whether both ends of an axis are finite
    pub fn is_axis_finite(&self, axis: usize) -> bool {
        self.min[axis].is_finite() && self.max[axis].is_finite()
    }

    /// Whether the z axis carries no finite extent (a planar shape)
    pub fn is_planar(&self) -> bool {
        !self.is_axis_finite(2)
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        let mut out = *self;
        for axis in 0..3 {
            out.min[axis] = self.min[axis].min(other.min[axis]);
            out.max[axis] = self.max[axis].max(other.max[axis]);
        }
        out
    }

    pub fn intersection(&self, other: &Bounds) -> Bounds {
        let mut out = *self;
        for axis in 0..3 {
            out.min[axis] = self.min[axis].max(other.min[axis]);
            out.max[axis] = self.max[axis].min(other.max[axis]);
        }
        out
    }

    pub fn translated(&self, offset: [f64; 3]) -> Bounds {
        let mut out = *self;
        for axis in 0..3 {
            out.min[axis] += offset[axis];
            out.max[axis] += offset[axis];
        }
        out
    }

    /// Grow every axis by `amount` on both sides
    pub fn expanded(&self, amount: f64) -> Bounds {
        let mut out = *self;
        for axis in 0..3 {
            out.min[axis] -= amount;
            out.max[axis] += amount;
        }
        out
    }

    /// Replace the z range
    pub fn with_z(&self, zmin: f64, zmax: f64) -> Bounds {
        let mut out = *self;
        out.min[2] = zmin;
        out.max[2] = zmax;
        out
    }

    /// Describe the first problem that makes the given axes unusable
    pub fn degeneracy(&self, axes: &[usize]) -> Option<String> {
        const NAMES: [&str; 3] = ["x", "y", "z"];
        for &axis in axes {
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if lo.is_nan() || hi.is_nan() {
                return Some(format!("{} bounds are NaN", NAMES[axis]));
            }
            if !lo.is_finite() || !hi.is_finite() {
                return Some(format!("{} bounds are unbounded", NAMES[axis]));
            }
            if lo > hi {
                return Some(format!("{} bounds are inverted ({} > {})", NAMES[axis], lo, hi));
            }
        }
        None
    }
}
