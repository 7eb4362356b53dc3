//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/vocab/config.toml, or VOCAB_CONFIG / --config)
//! 3. Environment variables (VOCAB_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::schedule::Scoring;

/// Environment variable prefix
const ENV_PREFIX: &str = "VOCAB";

/// Which storage backend holds the word list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// One JSON file
    #[default]
    Json,
    /// SQLite key-value table
    Sqlite,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Json => f.write_str("json"),
            BackendKind::Sqlite => f.write_str("sqlite"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(BackendKind::Json),
            "sqlite" => Ok(BackendKind::Sqlite),
            other => Err(format!(
                "Unknown backend '{}'. Use 'json' or 'sqlite'.",
                other
            )),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the word list
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Storage backend
    #[serde(default)]
    pub backend: BackendKind,

    /// How answers change points
    #[serde(default)]
    pub scoring: Scoring,

    /// Include notes in exported files
    #[serde(default)]
    pub export_notes: bool,

    /// Text-to-speech command; detected from PATH when unset
    #[serde(default)]
    pub speech_command: Option<String>,

    /// Write logs here instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: BackendKind::default(),
            scoring: Scoring::default(),
            export_notes: false,
            speech_command: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load from `path` if given, otherwise from the default location
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Unparseable values are logged and ignored.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_BACKEND", ENV_PREFIX)) {
            match val.parse() {
                Ok(backend) => self.backend = backend,
                Err(e) => warn!("Ignoring {}_BACKEND: {}", ENV_PREFIX, e),
            }
        }

        if let Ok(val) = std::env::var(format!("{}_SCORING", ENV_PREFIX)) {
            match val.parse() {
                Ok(scoring) => self.scoring = scoring,
                Err(e) => warn!("Ignoring {}_SCORING: {}", ENV_PREFIX, e),
            }
        }

        if let Ok(val) = std::env::var(format!("{}_SPEECH_COMMAND", ENV_PREFIX)) {
            self.speech_command = if val.is_empty() { None } else { Some(val) };
        }
    }

    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with VOCAB_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vocab")
            .join("config.toml")
    }

    /// Path of the JSON word list
    pub fn entries_path(&self) -> PathBuf {
        self.data_dir.join("languageEntries.json")
    }

    /// Path of the SQLite database
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("vocab.db")
    }

    /// Path the active backend stores its data in
    pub fn storage_path(&self) -> PathBuf {
        match self.backend {
            BackendKind::Json => self.entries_path(),
            BackendKind::Sqlite => self.sqlite_path(),
        }
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vocab")
}
