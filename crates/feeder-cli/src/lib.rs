pub mod cli;
pub mod config;

pub use cli::{Cli, Commands, GraphCommands, OutputFormat, SnapshotArg};
pub use config::{FeederConfig, OutputFormatSetting};
