use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use feeder_core::Phase;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level (defaults to the config file, then "info")
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    /// Write log output to this file instead of stderr
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Path to a feeder.toml configuration file
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Topology graph utilities
    Graph {
        #[command(subcommand)]
        command: GraphCommands,
    },
    /// Per-bus distance, voltage and position on one phase
    Buses {
        #[command(flatten)]
        source: SnapshotArg,
        /// Phase to collect (1/2/3 or a/b/c)
        #[arg(long)]
        phase: Option<Phase>,
        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Skip buses that cannot be read instead of failing
        #[arg(long)]
        skip_failed: bool,
        /// Write output to a file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
    /// Voltage versus distance along the lines carrying one phase
    Profile {
        #[command(flatten)]
        source: SnapshotArg,
        /// Phase to profile (1/2/3 or a/b/c)
        #[arg(long)]
        phase: Option<Phase>,
        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Skip buses that cannot be read instead of failing
        #[arg(long)]
        skip_failed: bool,
        /// Write output to a file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
    /// Per-conductor power of every element of a class
    Elements {
        #[command(flatten)]
        source: SnapshotArg,
        /// Element class, e.g. Load or PVSystem
        #[arg(long)]
        class: String,
        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Write output to a file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum GraphCommands {
    /// Graph stats summary
    Stats {
        #[command(flatten)]
        source: SnapshotArg,
    },
    /// Find islands in the feeder
    Islands {
        #[command(flatten)]
        source: SnapshotArg,
        /// Emit island IDs
        #[arg(long)]
        emit: bool,
    },
    /// Export graph to various formats
    Export {
        #[command(flatten)]
        source: SnapshotArg,
        /// Output format (e.g., graphviz)
        #[arg(long, default_value = "graphviz")]
        format: String,
        /// Optional output file path
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct SnapshotArg {
    /// Solved circuit snapshot (JSON); falls back to `model.snapshot` in the config
    #[arg(value_hint = ValueHint::FilePath)]
    pub snapshot: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Plain => "txt",
            OutputFormat::Json => "json",
        }
    }
}
