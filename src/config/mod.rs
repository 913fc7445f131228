//! Unified configuration for chronolink.
//!
//! Configuration is loaded with precedence: CLI args > Env vars > Config file > Defaults
//!
//! # Example config file (chronolink.toml)
//! ```toml
//! [graph]
//! anchor_node = "ei0"
//! add_inverted = false
//! dump_dir = "data/graphs"
//!
//! [output]
//! format = "json"
//! reduce = true
//! ```

mod defaults;

pub use defaults::*;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Main configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChronoConfig {
    /// Propagation and reduction settings
    pub graph: GraphSettings,
    /// How results are emitted
    pub output: OutputConfig,
}

impl ChronoConfig {
    /// Load configuration with precedence: CLI args > Env > File > Defaults
    pub fn load(
        config_path: Option<&str>,
        overrides: ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(ChronoConfig::default()));

        // Layer 1: Config file (if provided)
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Layer 2: Environment variables with CHRONOLINK_ prefix
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR));

        // Layer 3: CLI overrides
        figment = figment.merge(Serialized::defaults(overrides));

        Ok(figment.extract()?)
    }

    /// Load from environment and optional config file only (no CLI overrides)
    pub fn from_env(config_path: Option<&str>) -> Result<Self, ConfigError> {
        Self::load(config_path, ConfigOverrides::default())
    }
}

/// Settings that change how a graph is closed and reduced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Synthetic node removed at the start of reduction
    pub anchor_node: Option<String>,
    /// Enqueue inverted derived constraints eagerly
    pub add_inverted: bool,
    /// Directory for per-stage HTML matrix dumps during reduction
    pub dump_dir: Option<PathBuf>,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            anchor_node: None,
            add_inverted: DEFAULT_ADD_INVERTED,
            dump_dir: None,
        }
    }
}

impl GraphSettings {
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor_node = Some(anchor.into());
        self
    }

    pub fn with_add_inverted(mut self, add_inverted: bool) -> Self {
        self.add_inverted = add_inverted;
        self
    }

    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = Some(dir.into());
        self
    }
}

/// Output rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty-printed JSON document
    #[default]
    Json,
    /// One JSON object per line
    Jsonl,
    /// Graphviz DOT
    Dot,
    /// Plain-text relation matrix
    Table,
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" => Ok(OutputFormat::Jsonl),
            "dot" => Ok(OutputFormat::Dot),
            "table" => Ok(OutputFormat::Table),
            other => Err(ConfigError::Invalid(format!("unknown output format `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Run the minimization pass
    pub reduce: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            reduce: DEFAULT_REDUCE,
        }
    }
}

/// CLI overrides that take precedence over file and env config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputOverrides>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_inverted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dump_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduce: Option<bool>,
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),
    #[error("configuration error: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Figment(Box::new(e))
    }
}
