use std::path::Path;

use anyhow::Result;
use feeder_cli::{OutputFormat, SnapshotArg};
use feeder_extract::{collect_class_powers, ActiveCursor};
use tracing::{info, warn};

use super::{render_json, render_table, RunContext};

pub fn handle(
    ctx: &RunContext,
    source: &SnapshotArg,
    class: &str,
    format: Option<OutputFormat>,
    out: Option<&Path>,
) -> Result<()> {
    let format = ctx.format(format);
    info!("Collecting {} element powers", class);

    let mut solver = ctx.load_solver(source)?;
    let mut cursor = ActiveCursor::new(&mut solver);
    let powers = collect_class_powers(&mut cursor, class)?;
    if powers.is_empty() {
        warn!(class, "no elements of this class in the circuit");
    }

    let rendered = match format {
        OutputFormat::Json => render_json(&powers)?,
        OutputFormat::Plain => {
            let mut rows = Vec::new();
            for (element, conductors) in &powers {
                for (idx, power) in conductors.iter().enumerate() {
                    rows.push(format!(
                        "{element}\t{}\t{:.3}\t{:.3}\t{:.3}",
                        idx + 1,
                        power.real.value(),
                        power.imag.value(),
                        power.apparent().value()
                    ));
                }
            }
            let mut table = render_table("ELEMENT\tCONDUCTOR\tKW\tKVAR\tKVA", &rows)?;
            table.push_str(&format!("\n\n{} {} element(s)", powers.len(), class));
            table
        }
    };
    ctx.emit(
        &rendered,
        out,
        &format!("{}_powers.{}", class.to_ascii_lowercase(), format.extension()),
    )
}
