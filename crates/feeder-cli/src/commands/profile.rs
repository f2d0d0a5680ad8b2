use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use feeder_cli::{OutputFormat, SnapshotArg};
use feeder_core::{Diagnostics, Phase};
use feeder_extract::{voltage_tree, ActiveCursor, CollectPolicy, ProfilePoint, VoltageTree};
use serde::Serialize;
use tracing::info;

use super::{render_json, render_table, RunContext};

#[derive(Debug, Serialize)]
struct ProfileReport<'a> {
    phase: Phase,
    points: &'a BTreeMap<String, ProfilePoint>,
    segments: Vec<Segment>,
    diagnostics: &'a Diagnostics,
}

#[derive(Debug, Serialize)]
struct Segment {
    from: String,
    to: String,
    elements: Vec<String>,
}

/// Lines of the tree whose both ends have a profile position.
fn segments(tree: &VoltageTree) -> Vec<Segment> {
    let mut by_pair: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
    for edge in tree.graph.graph.edge_indices() {
        let Some((a, b)) = tree.graph.graph.edge_endpoints(edge) else {
            continue;
        };
        let (a, b) = (&tree.graph.graph[a].name, &tree.graph.graph[b].name);
        if !tree.positions.contains_key(a) || !tree.positions.contains_key(b) {
            continue;
        }
        let key = if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        };
        by_pair
            .entry(key)
            .or_default()
            .push(tree.graph.graph[edge].element.clone());
    }
    by_pair
        .into_iter()
        .map(|((from, to), elements)| Segment { from, to, elements })
        .collect()
}

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
    info!("Building phase {} voltage profile", phase);

    let mut solver = ctx.load_solver(source)?;
    let mut cursor = ActiveCursor::new(&mut solver);
    let tree = voltage_tree(&mut cursor, phase, policy)?;
    let segments = segments(&tree);

    let rendered = match format {
        OutputFormat::Json => render_json(&ProfileReport {
            phase,
            points: &tree.positions,
            segments,
            diagnostics: &tree.diagnostics,
        })?,
        OutputFormat::Plain => {
            let rows: Vec<String> = segments
                .iter()
                .map(|segment| {
                    let from = tree.positions[&segment.from];
                    let to = tree.positions[&segment.to];
                    format!(
                        "{}\t{}\t{:.4}\t{:.4}\t{:.4}\t{:.4}\t{}",
                        segment.from,
                        segment.to,
                        from.distance,
                        from.voltage.value(),
                        to.distance,
                        to.voltage.value(),
                        segment.elements.join(",")
                    )
                })
                .collect();
            let mut table = render_table(
                "FROM\tTO\tFROM DIST\tFROM PU\tTO DIST\tTO PU\tLINES",
                &rows,
            )?;
            table.push_str(&format!(
                "\n\nPhase {}: {} line segment(s), {} bus(es) placed",
                phase,
                segments.len(),
                tree.positions.len()
            ));
            if tree.diagnostics.has_issues() {
                table.push_str("\n\n");
                table.push_str(tree.diagnostics.to_string().trim_end());
            }
            table
        }
    };
    ctx.emit(
        &rendered,
        out,
        &format!("profile_phase_{}.{}", phase, format.extension()),
    )
}
