use crate::{
    error::{CoreError, Result},
    model::OutputFormat,
};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Fixed period between sampling ticks. Not configurable.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(2);

const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 10_000;
const MIN_COMMAND_TIMEOUT_MS: u64 = 100;
const MAX_COMMAND_TIMEOUT_MS: u64 = 60_000;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Upper bound on a single tool invocation, in milliseconds
    pub command_timeout_ms: u64,

    /// How snapshots are rendered
    pub format: OutputFormat,

    /// Stop after this many ticks; run until interrupted when unset
    pub max_ticks: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            format: OutputFormat::Text,
            max_ticks: None,
        }
    }
}

/// Configuration file contents. Absent keys leave the current value alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    command_timeout_ms: Option<u64>,
    format: Option<OutputFormat>,
    max_ticks: Option<u64>,
}

impl Config {
    /// Load configuration from multiple sources in order of preference:
    /// 1. CLI arguments override everything
    /// 2. JSON config file if specified
    /// 3. Default config file locations
    /// 4. Built-in defaults
    pub fn load(cli_config: Option<&CliConfig>, json_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::find_default_config() {
            config.merge(Self::read_file(&path)?);
        }

        if let Some(path) = json_path {
            config.merge(Self::read_file(path)?);
        }

        if let Some(cli) = cli_config {
            config.apply_cli_overrides(cli);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific JSON file on top of the defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge(Self::read_file(path)?);
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<FileConfig> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CoreError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            CoreError::config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    fn find_default_config() -> Option<PathBuf> {
        Self::default_config_paths()
            .into_iter()
            .find(|path| path.exists())
    }

    /// Get default configuration file search paths
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("hostsnap").join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".hostsnap.json"));
        }

        paths.push(PathBuf::from("hostsnap.json"));

        paths
    }

    fn merge(&mut self, other: FileConfig) {
        if let Some(timeout) = other.command_timeout_ms {
            self.command_timeout_ms = timeout;
        }
        if let Some(format) = other.format {
            self.format = format;
        }
        if other.max_ticks.is_some() {
            self.max_ticks = other.max_ticks;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &CliConfig) {
        if let Some(timeout) = cli.command_timeout_ms {
            self.command_timeout_ms = timeout;
        }
        if let Some(format) = cli.format {
            self.format = format;
        }
        if cli.max_ticks.is_some() {
            self.max_ticks = cli.max_ticks;
        }
    }

    fn validate(&self) -> Result<()> {
        if !(MIN_COMMAND_TIMEOUT_MS..=MAX_COMMAND_TIMEOUT_MS).contains(&self.command_timeout_ms) {
            return Err(CoreError::config(format!(
                "Command timeout must be between {MIN_COMMAND_TIMEOUT_MS}ms and {MAX_COMMAND_TIMEOUT_MS}ms"
            )));
        }

        if self.max_ticks == Some(0) {
            return Err(CoreError::config("Tick limit must be at least 1"));
        }

        Ok(())
    }

    /// Get the per-invocation timeout as Duration
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

/// CLI configuration (temporary struct for CLI parsing)
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub command_timeout_ms: Option<u64>,
    pub format: Option<OutputFormat>,
    pub max_ticks: Option<u64>,
}
