//! Vector outline driver (`.svg`).
//!
//! The document is opened once. Each shape contributes one group, in design
//! order, holding the contours of its `z = 0` slice. Reversing the shape
//! order therefore reorders the groups in the file.

use fabkit_core::{ExportError, ExportResult};
use fabkit_geometry::{
    write_svg_footer, write_svg_group_end, write_svg_group_start, write_svg_header, Rgb8,
};

use super::{stage_share, StageContext};
use crate::config::{ExportConfig, StrokeScaling};
use crate::source::ExportSource;

/// Group color for shapes without one
const DEFAULT_OUTLINE_COLOR: Rgb8 = [0, 0, 0];

pub(super) fn run_design(
    ctx: &StageContext<'_>,
    source: &ExportSource,
    config: &ExportConfig,
) -> ExportResult<()> {
    let design = source.require_design()?;
    let resolution = config.require_resolution()?;
    let mm = design.mm_per_unit();

    let bounds = design.bounds()?;
    let width_mm = bounds.extent(0) * mm;
    let height_mm = bounds.extent(1) * mm;
    let offset = [bounds.min[0] * mm, bounds.max[1] * mm];
    let design_stroke = StrokeScaling::FRACTION * width_mm.max(height_mm);

    let mut file = ctx.create_output()?;
    let count = design.shapes().len();
    file.encode(|w| {
        let io = |e: std::io::Error| ExportError::io(ctx.destination(), e);
        write_svg_header(w, width_mm, height_mm).map_err(io)?;

        for (index, shape) in design.shapes().iter().enumerate() {
            ctx.checkpoint()?;
            tracing::debug!(job_id = %ctx.job().short(), shape = shape.name(), "building outline field");
            let region = shape.region(design.border(), mm, resolution, true)?;
            let field = shape.build_field(&region, mm, ctx.hard())?;
            ctx.report(stage_share(index, count, 1));

            ctx.checkpoint()?;
            let contours = field.contour(ctx.hard())?;
            ctx.report(stage_share(index, count, 2));

            let stroke = match config.stroke_scaling {
                StrokeScaling::Design => design_stroke,
                StrokeScaling::PerShape => {
                    let [w_mm, h_mm] = region.footprint_mm(mm);
                    StrokeScaling::FRACTION * w_mm.max(h_mm)
                }
            };
            let color = shape.color().unwrap_or(DEFAULT_OUTLINE_COLOR);
            write_svg_group_start(w, shape.name(), color).map_err(io)?;
            for contour in &contours {
                contour
                    .write_svg_polyline(w, offset, mm, stroke, color)
                    .map_err(io)?;
            }
            write_svg_group_end(w).map_err(io)?;
            tracing::debug!(
                job_id = %ctx.job().short(),
                shape = shape.name(),
                contours = contours.len(),
                "outline written"
            );
            ctx.report(stage_share(index, count, 3));
        }

        write_svg_footer(w).map_err(io)
    })?;

    ctx.commit(file)
}
