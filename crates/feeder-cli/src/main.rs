use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use feeder_cli::{Cli, Commands, FeederConfig};
use tracing::{debug, error};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::RunContext;

/// Single, never-rotated log file; the appender creates missing directories.
fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .with_context(|| format!("log file {} has no file name", path.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy().into_owned())
        .build(dir)
        .with_context(|| format!("opening log file {}", path.display()))
}

fn init_logging(level: tracing::Level, log_file: Option<&Path>) -> Result<()> {
    let builder = FmtSubscriber::builder().with_max_level(level);
    match log_file {
        Some(path) => {
            let subscriber = builder
                .with_ansi(false)
                .with_writer(file_appender(path)?)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("setting default subscriber failed")?;
        }
        None => {
            let subscriber = builder.with_writer(io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("setting default subscriber failed")?;
        }
    }
    Ok(())
}

fn setup(cli: &Cli) -> Result<FeederConfig> {
    let config = FeederConfig::load_optional(cli.config.as_deref())
        .with_context(|| match &cli.config {
            Some(path) => format!("loading config {}", path.display()),
            None => "loading default config".to_string(),
        })?;
    let level = match cli.log_level {
        Some(level) => level,
        None => config.log_level()?,
    };
    let log_file = cli.log_file.as_deref().or(config.logging.file.as_deref());
    init_logging(level, log_file)?;
    debug!(?config, "configuration loaded");
    Ok(config)
}

fn run(cli: &Cli, ctx: &RunContext) -> Result<()> {
    match &cli.command {
        Commands::Graph { command } => commands::graph::handle(command, ctx),
        Commands::Buses {
            source,
            phase,
            format,
            skip_failed,
            out,
        } => commands::buses::handle(
            ctx,
            source,
            *phase,
            *format,
            *skip_failed,
            out.as_deref(),
        ),
        Commands::Profile {
            source,
            phase,
            format,
            skip_failed,
            out,
        } => commands::profile::handle(
            ctx,
            source,
            *phase,
            *format,
            *skip_failed,
            out.as_deref(),
        ),
        Commands::Elements {
            source,
            class,
            format,
            out,
        } => commands::elements::handle(ctx, source, class, *format, out.as_deref()),
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match setup(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    };

    let ctx = RunContext::new(config);
    if let Err(e) = run(&cli, &ctx) {
        error!("command failed: {e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
