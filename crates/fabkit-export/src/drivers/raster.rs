//! Raster image drivers (`.png`).

use fabkit_core::ExportResult;
use fabkit_geometry::{compute_region, ImageTile};

use super::StageContext;
use crate::config::ExportConfig;
use crate::source::ExportSource;

/// Share of progress spent before the write
const RENDER_SHARE: usize = 90;

/// Render every shape over the design region and composite in design order
///
/// With `make_heightmap` the combined shape is rendered once instead.
pub(super) fn run_design(
    ctx: &StageContext<'_>,
    source: &ExportSource,
    config: &ExportConfig,
) -> ExportResult<()> {
    let design = source.require_design()?;
    let resolution = config.require_resolution()?;
    let mm = design.mm_per_unit();

    let bounds = design.bounds()?;
    let region = compute_region(&bounds, 0.0, mm, resolution, bounds.is_planar())?;
    tracing::debug!(job_id = %ctx.job().short(), dims = ?region.dims(), "raster region");

    let tiles = if config.make_heightmap {
        ctx.checkpoint()?;
        let shape = source.require_combined_shape()?;
        let tile = shape.render(&region, mm, ctx.hard())?;
        ctx.report(RENDER_SHARE as u8);
        vec![tile]
    } else {
        let count = design.shapes().len();
        let mut tiles = Vec::with_capacity(count);
        for (index, shape) in design.shapes().iter().enumerate() {
            ctx.checkpoint()?;
            tracing::debug!(job_id = %ctx.job().short(), shape = shape.name(), "rendering shape");
            tiles.push(shape.render(&region, mm, ctx.hard())?);
            ctx.report((RENDER_SHARE * (index + 1) / count) as u8);
        }
        tiles
    };

    ctx.checkpoint()?;
    let image = ImageTile::merge(&tiles)?;
    write_image(ctx, &image)
}

/// Render a field from the configured view angles
pub(super) fn run_field(
    ctx: &StageContext<'_>,
    source: &ExportSource,
    config: &ExportConfig,
) -> ExportResult<()> {
    let field = source.require_field()?;
    let pixels_per_unit = config.require_resolution()? * field.mm_per_unit();

    ctx.checkpoint()?;
    let image = field.render(config.alpha, config.beta, pixels_per_unit)?;
    ctx.report(RENDER_SHARE as u8);
    write_image(ctx, &image)
}

fn write_image(ctx: &StageContext<'_>, image: &ImageTile) -> ExportResult<()> {
    let mut file = ctx.create_output()?;
    file.encode(|w| Ok(image.write_png(w)?))?;
    ctx.commit(file)
}
