//! Configuration loader for the astra command line.
//!
//! `defaults/astra.default.toml` is embedded so that the documented defaults and
//! runtime behavior stay in sync. User files are layered on top through
//! [`Loader`] before deserializing into [`AstraConfig`].

use crate::astra::formats::Format;
use crate::astra::testing::RunOptions;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/astra.default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct AstraConfig {
    pub diagnostics: DiagnosticsConfig,
    pub render: RenderConfig,
    pub conformance: ConformanceConfig,
}

/// Where engine diagnostics go.
#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticsConfig {
    pub enabled: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub format: Format,
    pub show_locations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConformanceConfig {
    #[serde(default)]
    pub limit: Option<usize>,
    pub stop_on_defect: bool,
}

impl ConformanceConfig {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            limit: self.limit,
            stop_on_defect: self.stop_on_defect,
        }
    }
}

/// Layers user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. from a command line flag.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<AstraConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<AstraConfig, ConfigError> {
    Loader::new().build()
}
