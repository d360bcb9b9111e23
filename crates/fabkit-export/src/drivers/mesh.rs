//! Mesh drivers (`.stl`).
//!
//! Per-shape meshes are concatenated. Overlapping shapes keep their
//! overlapping facets; nothing is unioned.

use fabkit_core::ExportResult;
use fabkit_geometry::Mesh;

use super::{stage_share, StageContext};
use crate::config::ExportConfig;
use crate::source::ExportSource;

/// Progress after the fast triangulation of a field source
const FIELD_TRIANGULATED: u8 = 60;

pub(super) fn run_design(
    ctx: &StageContext<'_>,
    source: &ExportSource,
    config: &ExportConfig,
) -> ExportResult<()> {
    let design = source.require_design()?;
    let resolution = config.require_resolution()?;
    let mm = design.mm_per_unit();

    let count = design.shapes().len();
    let mut meshes = Vec::with_capacity(count);
    for (index, shape) in design.shapes().iter().enumerate() {
        ctx.checkpoint()?;
        tracing::debug!(job_id = %ctx.job().short(), shape = shape.name(), "building mesh field");
        let region = shape.region(design.border(), mm, resolution, false)?;
        let field = shape.build_field(&region, mm, ctx.hard())?;
        ctx.report(stage_share(index, count, 1));

        ctx.checkpoint()?;
        let mesh = if config.use_fast_triangulation {
            field.triangulate_fast()
        } else {
            field.triangulate(ctx.hard())?
        };
        tracing::debug!(job_id = %ctx.job().short(), shape = shape.name(), facets = mesh.len(), "triangulated");
        meshes.push(mesh);
        ctx.report(stage_share(index, count, 2));
    }

    ctx.checkpoint()?;
    let merged = Mesh::merge(&meshes);
    write_mesh(ctx, &merged, mm)
}

/// Fast triangulation of an existing field
pub(super) fn run_field(
    ctx: &StageContext<'_>,
    source: &ExportSource,
    _config: &ExportConfig,
) -> ExportResult<()> {
    let field = source.require_field()?;

    ctx.checkpoint()?;
    let mesh = field.triangulate_fast();
    ctx.report(FIELD_TRIANGULATED);
    write_mesh(ctx, &mesh, field.mm_per_unit())
}

fn write_mesh(ctx: &StageContext<'_>, mesh: &Mesh, mm_per_unit: f64) -> ExportResult<()> {
    let mut file = ctx.create_output()?;
    file.encode(|w| Ok(mesh.write_stl(w, mm_per_unit)?))?;
    ctx.commit(file)
}
