//! `feeder.toml` configuration.
//!
//! Every section is optional and falls back to its defaults, so a config can
//! set just the snapshot path. Command-line flags take precedence over
//! anything read here.
//!
//! ```toml
//! [model]
//! snapshot = "feeders/ieee13.json"
//!
//! [output]
//! dir = "output"
//! format = "json"
//!
//! [analysis]
//! phase = "1"
//!
//! [logging]
//! level = "debug"
//! file = "output/log.txt"
//! ```

use std::path::{Path, PathBuf};

use feeder_core::{FeederError, FeederResult, Phase};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeederConfig {
    pub model: ModelConfig,
    pub output: OutputConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Solved circuit snapshot used when a command is given none.
    pub snapshot: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// When set, command output is written here instead of stdout.
    pub dir: Option<PathBuf>,
    pub format: OutputFormatSetting,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatSetting {
    #[default]
    Plain,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Phase analysed when `--phase` is not given.
    pub phase: String,
    /// Skip unreadable buses instead of aborting the collection.
    pub skip_failed: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            phase: "1".to_string(),
            skip_failed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl FeederConfig {
    /// Loads from `path`; a missing file is an error.
    pub fn load_from(path: &Path) -> FeederResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|err| FeederError::Config(format!("{}: {err}", path.display())))
    }

    /// Explicit path, or defaults when none was given.
    pub fn load_optional(path: Option<&Path>) -> FeederResult<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    pub fn save_to(&self, path: &Path) -> FeederResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|err| FeederError::Config(err.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn phase(&self) -> FeederResult<Phase> {
        self.analysis.phase.parse()
    }

    pub fn log_level(&self) -> FeederResult<tracing::Level> {
        self.logging.level.parse().map_err(|_| {
            FeederError::Config(format!("unknown log level '{}'", self.logging.level))
        })
    }
}
