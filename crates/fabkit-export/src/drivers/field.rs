//! Raw field drivers (`.asdf`).

use fabkit_core::ExportResult;
use fabkit_geometry::Field;

use super::StageContext;
use crate::config::ExportConfig;
use crate::source::ExportSource;

const FIELD_BUILT: u8 = 50;

/// Sample the combined shape and serialize the field
///
/// Planar designs are sampled on the `z = 0` plane.
pub(super) fn run_design(
    ctx: &StageContext<'_>,
    source: &ExportSource,
    config: &ExportConfig,
) -> ExportResult<()> {
    let design = source.require_design()?;
    let resolution = config.require_resolution()?;
    let mm = design.mm_per_unit();

    ctx.checkpoint()?;
    let shape = source.require_combined_shape()?;
    let flatten = shape.bounds()?.is_planar();
    let region = shape.region(design.border(), mm, resolution, flatten)?;
    let field = shape.build_field(&region, mm, ctx.hard())?;
    ctx.report(FIELD_BUILT);

    write_field(ctx, &field)
}

pub(super) fn run_field(
    ctx: &StageContext<'_>,
    source: &ExportSource,
    _config: &ExportConfig,
) -> ExportResult<()> {
    let field = source.require_field()?;
    write_field(ctx, field)
}

fn write_field(ctx: &StageContext<'_>, field: &Field) -> ExportResult<()> {
    let mut file = ctx.create_output()?;
    file.encode(|w| Ok(field.write_to(w)?))?;
    ctx.commit(file)
}
