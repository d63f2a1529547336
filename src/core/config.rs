//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::wizard::ValidationMode;

/// Stepform configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// When the wizard validates input (`on_navigation` or `live`)
    pub validation_mode: Option<ValidationMode>,

    /// Directory submission records are written to
    pub output_dir: Option<PathBuf>,

    /// Form definition used when `--form` is not given
    pub default_form: Option<PathBuf>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        Self::load_from(
            Self::global_config_path().as_deref(),
            |key| std::env::var(key).ok(),
        )
    }

    /// Load with an explicit global file and environment lookup
    pub fn load_from(global_path: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Self {
        // 1. Built-in defaults (already in Default impl)
        let mut config = Config::default();

        // 2. Global user config (~/.config/stepform/config.yaml)
        if let Some(path) = global_path {
            if let Some(global) = Self::read_file(path) {
                config.merge(global);
            }
        }

        // 3. Environment variables
        config.apply_env(env);
        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read config file");
                return None;
            }
        };
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded config file");
                Some(config)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                None
            }
        }
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(mode) = env("STEPFORM_VALIDATION_MODE") {
            match mode.parse() {
                Ok(mode) => self.validation_mode = Some(mode),
                Err(e) => tracing::warn!(error = %e, "ignoring STEPFORM_VALIDATION_MODE"),
            }
        }
        if let Some(dir) = env("STEPFORM_OUTPUT_DIR").filter(|s| !s.is_empty()) {
            self.output_dir = Some(PathBuf::from(dir));
        }
        if let Some(form) = env("STEPFORM_FORM").filter(|s| !s.is_empty()) {
            self.default_form = Some(PathBuf::from(form));
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "stepform")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.validation_mode.is_some() {
            self.validation_mode = other.validation_mode;
        }
        if other.output_dir.is_some() {
            self.output_dir = other.output_dir;
        }
        if other.default_form.is_some() {
            self.default_form = other.default_form;
        }
    }

    /// Validation mode, defaulting to on-navigation
    pub fn validation_mode(&self) -> ValidationMode {
        self.validation_mode.unwrap_or_default()
    }

    /// Output directory, defaulting to the current directory
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
