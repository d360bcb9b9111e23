//! Computation-graph dump driver (`.dot`).

use fabkit_core::{ExportError, ExportResult};

use super::StageContext;
use crate::config::ExportConfig;
use crate::source::ExportSource;

const GRAPH_EVALUATED: u8 = 25;

pub(super) fn run_design(
    ctx: &StageContext<'_>,
    source: &ExportSource,
    config: &ExportConfig,
) -> ExportResult<()> {
    ctx.checkpoint()?;
    let shape = source.require_combined_shape()?;
    let tape = shape.compile()?;
    tracing::debug!(job_id = %ctx.job().short(), nodes = tape.len(), "graph compiled");
    ctx.report(GRAPH_EVALUATED);

    let mut file = ctx.create_output()?;
    file.encode(|w| {
        tape.write_dot(w, config.dot_arrays)
            .map_err(|e| ExportError::io(ctx.destination(), e))
    })?;
    ctx.commit(file)
}
