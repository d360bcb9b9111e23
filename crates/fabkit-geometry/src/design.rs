//! Designs: ordered shapes plus the parameters shared by every export.

use fabkit_core::{DesignUnits, GeometryError, GeometryResult};

use crate::bounds::Bounds;
use crate::expr::Expr;
use crate::shape::Shape;

/// Default border added around each shape, as a fraction of its extent
pub const DEFAULT_BORDER: f64 = 0.05;

/// An ordered collection of shapes
///
/// Read-only while exports run; share it as `Arc<Design>` to run several
/// exports at once.
#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    shapes: Vec<Shape>,
    bounds: Option<Bounds>,
    units: DesignUnits,
    border: f64,
}

impl Default for Design {
    fn default() -> Self {
        Self::new(DesignUnits::default())
    }
}

impl Design {
    pub fn new(units: DesignUnits) -> Self {
        Self {
            shapes: Vec::new(),
            bounds: None,
            units,
            border: DEFAULT_BORDER,
        }
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shapes.push(shape);
        self
    }

    /// Fix the design extent instead of deriving it from the shapes
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_border(mut self, border: f64) -> Self {
        self.border = border;
        self
    }

    pub fn push_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn units(&self) -> DesignUnits {
        self.units
    }

    pub fn mm_per_unit(&self) -> f64 {
        self.units.mm_per_unit()
    }

    pub fn border(&self) -> f64 {
        self.border
    }

    /// Same design with the shape order reversed
    pub fn reversed(&self) -> Design {
        let mut out = self.clone();
        out.shapes.reverse();
        out
    }

    /// The union of every shape, or `None` for an empty design
    pub fn shape(&self) -> Option<Shape> {
        match self.shapes.as_slice() {
            [] => None,
            [only] => Some(only.clone()),
            [first, rest @ ..] => {
                let expr = rest
                    .iter()
                    .fold(first.expr().clone(), |acc, s| Expr::union(acc, s.expr().clone()));
                Some(Shape::new("design", expr))
            }
        }
    }

    /// Design extent: the explicit bounds, or the union of shape bounds
    pub fn bounds(&self) -> GeometryResult<Bounds> {
        if let Some(bounds) = self.bounds {
            return match bounds.degeneracy(&[0, 1]) {
                Some(reason) => Err(GeometryError::DegenerateBounds {
                    shape: "design".to_string(),
                    reason,
                }),
                None => Ok(bounds),
            };
        }
        let mut shapes = self.shapes.iter();
        let first = shapes.next().ok_or_else(|| GeometryError::DegenerateBounds {
            shape: "design".to_string(),
            reason: "design has no shapes".to_string(),
        })?;
        shapes.try_fold(first.bounds()?, |acc, shape| -> GeometryResult<Bounds> {
            Ok(acc.union(&shape.bounds()?))
        })
    }
}
