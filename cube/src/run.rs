//! One complete build: partitions, department roll-up, manifest.

use tracing::info;

use crate::context::CubeContext;
use crate::department::DepartmentAggregator;
use crate::error::Result;
use crate::header;
use crate::manifest::{ArtifactEntry, RunManifest};
use crate::output::{ArtifactWriter, GraphSink};
use crate::partition::{report_gap, PartitionDriver, PartitionGap, Throttle};

/// Logical name of the department aggregate artifact.
pub const DEPARTMENT_ARTIFACT: &str = "dep";

/// Runs every stage against `ctx`, writes the artifacts and the manifest
/// through `writer`, and returns the manifest.
///
/// The header is parsed from the municipality sheet and shared by all
/// partitions; the department stage parses it again on its own.
///
/// # Errors
///
/// Returns the first error of any stage. Input errors are found by the
/// gap scan, before the first artifact is written. A cancelled run or a
/// write failure leaves the artifacts already written in place; the manifest
/// is only written on success.
pub fn build(
    ctx: CubeContext<'_>,
    throttle: &Throttle,
    writer: &mut ArtifactWriter,
) -> Result<RunManifest> {
    let sheet = ctx.source.sheet(ctx.layout.municipality_sheet)?;
    let header = header::parse(sheet, ctx.layout, ctx.naming)?;
    info!(
        dimensions = header.dimensions.len(),
        columns = header.column_count(),
        "header parsed"
    );

    let gap = PartitionGap::scan(&ctx, &header)?;
    report_gap(&gap);

    let partitions = PartitionDriver::new(ctx, &header, throttle).run(writer)?;

    let department = DepartmentAggregator::new(ctx).generate()?;
    let file = writer.accept(DEPARTMENT_ARTIFACT, &department.graph)?;
    let department = ArtifactEntry {
        name: DEPARTMENT_ARTIFACT.to_owned(),
        file,
        statements: department.graph.len(),
        observations: department.stats.observations,
        rows_selected: department.stats.rows_selected,
    };

    let total_statements =
        partitions.iter().map(|e| e.statements).sum::<usize>() + department.statements;
    let manifest = RunManifest {
        dataset: ctx.dataset_iri(),
        format: writer.format(),
        partitions,
        department: Some(department),
        total_statements,
        partition_gap: gap.to_entry(),
    };
    manifest.write(writer.dir())?;
    info!(
        total_statements,
        dir = %writer.dir().display(),
        "build complete"
    );
    Ok(manifest)
}
