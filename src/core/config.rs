//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;
use tracing::warn;

use crate::core::store::DEFAULT_SENSITIVITY;

/// riskreg configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workbook used when `--workbook` is not given
    pub workbook: Option<PathBuf>,

    /// Default output format
    pub default_format: Option<String>,

    /// Sensitivity written into new workbooks
    pub default_sensitivity: Option<f64>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/riskreg/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                match std::fs::read_to_string(&global_path) {
                    Ok(contents) => match serde_yml::from_str::<Config>(&contents) {
                        Ok(global) => config.merge(global),
                        Err(e) => warn!(path = %global_path.display(), error = %e, "ignoring unreadable config"),
                    },
                    Err(e) => warn!(path = %global_path.display(), error = %e, "cannot read config"),
                }
            }
        }

        // 3. Environment variables
        config.apply_env(|key| std::env::var(key).ok());

        config
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "riskreg")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(workbook) = lookup("RISKREG_WORKBOOK").filter(|s| !s.is_empty()) {
            self.workbook = Some(PathBuf::from(workbook));
        }
        if let Some(format) = lookup("RISKREG_FORMAT").filter(|s| !s.is_empty()) {
            self.default_format = Some(format);
        }
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.workbook.is_some() {
            self.workbook = other.workbook;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.default_sensitivity.is_some() {
            self.default_sensitivity = other.default_sensitivity;
        }
    }

    /// Sensitivity for new workbooks
    pub fn sensitivity(&self) -> f64 {
        self.default_sensitivity.unwrap_or(DEFAULT_SENSITIVITY)
    }
}
