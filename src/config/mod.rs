//! Session settings, read from a TOML file.
//!
//! Precedence, lowest first: built-in defaults, the config file
//! (`--config`, else `<config dir>/c2e-live/config.toml` when it exists),
//! the `C2E_ENGINE` environment variable, command-line flags.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::consts::{DEFAULT_DECLARATION, DEFAULT_ENGINE_COMMAND, DEFAULT_LOAD_TIMEOUT};
use crate::controller::ControllerConfig;
use crate::format::{ClassMapping, FormatterConfig};

/// Environment variable naming the explainer executable.
pub const ENGINE_ENV_VAR: &str = "C2E_ENGINE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub load_timeout_ms: u64,
    pub default_declaration: String,
    pub engine_command: String,
    /// Ask the engine for class-annotated markup instead of plain text.
    pub highlight: bool,
    pub classes: ClassMapping,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            load_timeout_ms: DEFAULT_LOAD_TIMEOUT.as_millis() as u64,
            default_declaration: DEFAULT_DECLARATION.to_string(),
            engine_command: DEFAULT_ENGINE_COMMAND.to_string(),
            highlight: false,
            classes: ClassMapping::default(),
        }
    }
}

impl Settings {
    /// `<config dir>/c2e-live/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("c2e-live").join("config.toml"))
    }

    /// Read settings from `path`, or from the default path when it exists,
    /// or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `C2E_ENGINE` if it is set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(command) = std::env::var(ENGINE_ENV_VAR)
            && !command.is_empty()
        {
            self.engine_command = command;
        }
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    pub fn formatter(&self) -> FormatterConfig {
        if self.highlight {
            FormatterConfig::Html(self.classes.clone())
        } else {
            FormatterConfig::Plain
        }
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            load_timeout: self.load_timeout(),
            default_declaration: self.default_declaration.clone(),
            formatter: self.formatter(),
        }
    }
}
