pub mod buses;
pub mod elements;
pub mod graph;
pub mod profile;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use feeder_cli::{FeederConfig, OutputFormat, OutputFormatSetting, SnapshotArg};
use feeder_core::Phase;
use feeder_extract::SnapshotSolver;
use tabwriter::TabWriter;
use tracing::info;

/// Configuration shared by every command, with flag-over-config resolution.
pub struct RunContext {
    config: FeederConfig,
}

impl RunContext {
    pub fn new(config: FeederConfig) -> Self {
        Self { config }
    }

    pub fn snapshot_path(&self, source: &SnapshotArg) -> Result<PathBuf> {
        source
            .snapshot
            .clone()
            .or_else(|| self.config.model.snapshot.clone())
            .ok_or_else(|| anyhow!("no snapshot given and no [model] snapshot in the config"))
    }

    pub fn load_solver(&self, source: &SnapshotArg) -> Result<SnapshotSolver> {
        let path = self.snapshot_path(source)?;
        SnapshotSolver::load(&path).with_context(|| format!("loading {}", path.display()))
    }

    pub fn phase(&self, flag: Option<Phase>) -> Result<Phase> {
        match flag {
            Some(phase) => Ok(phase),
            None => Ok(self.config.phase()?),
        }
    }

    pub fn format(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.unwrap_or(match self.config.output.format {
            OutputFormatSetting::Plain => OutputFormat::Plain,
            OutputFormatSetting::Json => OutputFormat::Json,
        })
    }

    pub fn skip_failed(&self, flag: bool) -> bool {
        flag || self.config.analysis.skip_failed
    }

    /// Sends rendered output to `out`, else to `[output] dir/<default_name>`, else stdout.
    pub fn emit(&self, rendered: &str, out: Option<&Path>, default_name: &str) -> Result<()> {
        let target = match (out, &self.config.output.dir) {
            (Some(path), _) => Some(path.to_path_buf()),
            (None, Some(dir)) => {
                fs::create_dir_all(dir)
                    .with_context(|| format!("creating output directory {}", dir.display()))?;
                Some(dir.join(default_name))
            }
            (None, None) => None,
        };
        match target {
            Some(path) => {
                fs::write(&path, rendered)
                    .with_context(|| format!("writing output to {}", path.display()))?;
                info!(path = %path.display(), "output written");
                println!("Output written to {}", path.display());
            }
            None => println!("{rendered}"),
        }
        Ok(())
    }
}

/// Lays out tab-separated rows as aligned columns.
pub fn render_table(header: &str, rows: &[String]) -> Result<String> {
    let mut writer = TabWriter::new(Vec::new());
    writeln!(writer, "{header}")?;
    for row in rows {
        writeln!(writer, "{row}")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow!("flushing table: {err}"))?;
    let mut table = String::from_utf8(bytes).context("table is not UTF-8")?;
    if table.ends_with('\n') {
        table.pop();
    }
    Ok(table)
}

pub fn render_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|err| anyhow!("serializing output to JSON: {err}"))
}
