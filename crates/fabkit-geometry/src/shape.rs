//! Named shapes and the operations exporters run on them.

use std::sync::Arc;

use fabkit_core::{CancellationToken, GeometryError, GeometryResult};

use crate::bounds::Bounds;
use crate::expr::Expr;
use crate::field::Field;
use crate::raster::{ImageTile, Rgb8};
use crate::region::{compute_region, Region};
use crate::tape::Tape;

/// An expression with a name and an optional display color
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    name: String,
    expr: Arc<Expr>,
    color: Option<Rgb8>,
}

impl Shape {
    pub fn new(name: impl Into<String>, expr: Arc<Expr>) -> Self {
        Self {
            name: name.into(),
            expr,
            color: None,
        }
    }

    pub fn with_color(mut self, color: Rgb8) -> Self {
        self.color = Some(color);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expr(&self) -> &Arc<Expr> {
        &self.expr
    }

    pub fn color(&self) -> Option<Rgb8> {
        self.color
    }

    /// Fail with `Evaluation` if any parameter in the tree is unusable
    pub fn check(&self) -> GeometryResult<()> {
        self.expr
            .validate()
            .map_err(|reason| GeometryError::Evaluation {
                shape: self.name.clone(),
                reason,
            })
    }

    /// Bounding box; x and y must be finite, z may be unbounded
    pub fn bounds(&self) -> GeometryResult<Bounds> {
        self.check()?;
        let bounds = self.expr.bounds();
        match bounds.degeneracy(&[0, 1]) {
            Some(reason) => Err(self.degenerate(reason)),
            None => Ok(bounds),
        }
    }

    /// Sampling region around this shape
    ///
    /// `margin` is the border fraction added on each side.
    pub fn region(
        &self,
        margin: f64,
        mm_per_unit: f64,
        resolution: f64,
        flatten: bool,
    ) -> GeometryResult<Region> {
        let bounds = self.bounds()?;
        if !flatten {
            if let Some(reason) = bounds.degeneracy(&[2]) {
                return Err(self.degenerate(reason));
            }
        }
        compute_region(&bounds, margin, mm_per_unit, resolution, flatten)
    }

    /// Height-map raster of this shape over `region`
    ///
    /// One pixel per xy sample. A pixel's height comes from the highest
    /// inside sample in its column; flat regions render at full height.
    pub fn render(
        &self,
        region: &Region,
        mm_per_unit: f64,
        token: &CancellationToken,
    ) -> GeometryResult<ImageTile> {
        self.check()?;
        let [nx, ny, nz] = region.checked_dims()?;
        let footprint = region.footprint_mm(mm_per_unit);
        tracing::trace!(shape = %self.name, width_mm = footprint[0], height_mm = footprint[1], "rendering");

        let mut tile = ImageTile::new(
            [region.min[0], region.min[1]],
            region.pitch(),
            nx as u32,
            ny as u32,
            self.color,
        );
        for j in 0..ny {
            token.check()?;
            let y = region.sample(1, j, ny);
            let row = (ny - 1 - j) as u32;
            for i in 0..nx {
                let x = region.sample(0, i, nx);
                let top = (0..nz)
                    .rev()
                    .find(|&k| self.expr.eval([x, y, region.sample(2, k, nz)]) < 0.0);
                if let Some(k) = top {
                    let shade = if nz == 1 { 255 } else { 1 + (254 * k) / (nz - 1) };
                    tile.raise(i as u32, row, shade as u8);
                }
            }
        }
        Ok(tile)
    }

    /// Sample this shape into a field
    pub fn build_field(
        &self,
        region: &Region,
        mm_per_unit: f64,
        token: &CancellationToken,
    ) -> GeometryResult<Field> {
        self.check()?;
        Field::build(&self.expr, *region, mm_per_unit, token)
    }

    /// Flatten the expression into its evaluation graph
    pub fn compile(&self) -> GeometryResult<Tape> {
        self.check()?;
        Ok(Tape::compile(&self.name, &self.expr))
    }

    fn degenerate(&self, reason: String) -> GeometryError {
        GeometryError::DegenerateBounds {
            shape: self.name.clone(),
            reason,
        }
    }
}
