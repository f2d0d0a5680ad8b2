use std::path::Path;

use anyhow::Result;
use feeder_cli::{OutputFormat, SnapshotArg};
use feeder_core::Phase;
use feeder_extract::{collect_phase_aggregates, ActiveCursor, CollectPolicy, PhaseAggregates};
use tracing::info;

use super::{render_json, render_table, RunContext};

pub fn handle(
    ctx: &RunContext,
    source: &SnapshotArg,
    phase: Option<Phase>,
    format: Option<OutputFormat>,
    skip_failed: bool,
    out: Option<&Path>,
) -> Result<()> {
    let phase = ctx.phase(phase)?;
    let format = ctx.format(format);
    let policy = if ctx.skip_failed(skip_failed) {
        CollectPolicy::SkipAndRecord
    } else {
        CollectPolicy::Abort
    };
    info!("Collecting phase {} bus aggregates ({:?})", phase, policy);

    let mut solver = ctx.load_solver(source)?;
    let mut cursor = ActiveCursor::new(&mut solver);
    let aggregates = collect_phase_aggregates(&mut cursor, phase, policy)?;

    let rendered = match format {
        OutputFormat::Json => render_json(&aggregates)?,
        OutputFormat::Plain => render_plain(&aggregates)?,
    };
    ctx.emit(
        &rendered,
        out,
        &format!("buses_phase_{}.{}", phase, format.extension()),
    )
}

fn render_plain(aggregates: &PhaseAggregates) -> Result<String> {
    let rows: Vec<String> = aggregates
        .buses()
        .map(|bus| {
            let coordinate = aggregates.coordinate[bus];
            format!(
                "{bus}\t{:.4}\t{:.4}\t{}\t{}",
                aggregates.distance[bus],
                aggregates.voltage[bus].value(),
                coordinate.x,
                coordinate.y
            )
        })
        .collect();
    let mut rendered = render_table("BUS\tDISTANCE\tVOLTAGE (pu)\tX\tY", &rows)?;

    rendered.push_str(&format!(
        "\n\nPhase {}: {} bus(es)",
        aggregates.phase,
        aggregates.len()
    ));
    if let Some((lo, hi)) = aggregates.voltage_range() {
        rendered.push_str(&format!(
            ", voltage {:.4}..{:.4} pu",
            lo.value(),
            hi.value()
        ));
    }
    if aggregates.diagnostics.has_issues() {
        rendered.push_str("\n\n");
        rendered.push_str(aggregates.diagnostics.to_string().trim_end());
    }
    Ok(rendered)
}
