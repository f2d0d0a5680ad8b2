use anyhow::Result;
use feeder_cli::{GraphCommands, SnapshotArg};
use feeder_core::{graph_utils, TopologyGraph};
use feeder_extract::{build_topology_graph, ActiveCursor};
use tracing::info;

use super::RunContext;

fn load_topology(ctx: &RunContext, source: &SnapshotArg) -> Result<TopologyGraph> {
    let mut solver = ctx.load_solver(source)?;
    let mut cursor = ActiveCursor::new(&mut solver);
    Ok(build_topology_graph(&mut cursor)?)
}

pub fn handle(command: &GraphCommands, ctx: &RunContext) -> Result<()> {
    match command {
        GraphCommands::Stats { source } => {
            let path = ctx.snapshot_path(source)?;
            info!("Displaying graph statistics for {}", path.display());
            let topo = load_topology(ctx, source)?;
            let stats = graph_utils::graph_stats(&topo)?;
            println!("Graph statistics for {}:", path.display());
            println!("  Source bus    : {}", topo.source_bus().unwrap_or("-"));
            println!("  Nodes         : {}", stats.node_count);
            println!("  Edges         : {}", stats.edge_count);
            println!("  Bus pairs     : {}", stats.distinct_pairs);
            println!("  Components    : {}", stats.connected_components);
            println!(
                "  Degree [min/avg/max]: {}/{:.2}/{}",
                stats.min_degree, stats.avg_degree, stats.max_degree
            );
            println!("  Density       : {:.4}", stats.density);
            println!("  Radial        : {}", if stats.is_radial { "yes" } else { "no" });
            Ok(())
        }
        GraphCommands::Islands { source, emit } => {
            info!("Finding islands (emit_id: {})", emit);
            let topo = load_topology(ctx, source)?;
            let analysis = graph_utils::find_islands(&topo)?;
            for summary in &analysis.islands {
                let marker = if summary.energized { " (energized)" } else { "" };
                println!(
                    "Island {}: {} node(s){marker}",
                    summary.island_id, summary.node_count
                );
            }
            if *emit {
                println!("\nNode -> Island assignments:");
                for assignment in &analysis.assignments {
                    println!(
                        "  idx {:>3}: {:<20} -> island {}",
                        assignment.node_index, assignment.label, assignment.island_id
                    );
                }
            }
            Ok(())
        }
        GraphCommands::Export {
            source,
            format,
            out,
        } => {
            info!("Exporting graph in {} format", format);
            let topo = load_topology(ctx, source)?;
            let dot = graph_utils::export_graph(&topo, format)?;
            ctx.emit(&dot, out.as_deref(), "topology.dot")
        }
    }
}
