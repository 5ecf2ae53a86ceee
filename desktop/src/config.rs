//! User configuration, read from `config.toml` in the platform config dir.

use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "multiplication_practice";
pub const ORG_NAME: &str = "practice";

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", ORG_NAME, APP_NAME)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Overrides where practice data is kept.
    pub data_dir: Option<PathBuf>,
    pub autosave_debounce_ms: u64,
    /// Used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// How long the correct/incorrect banner stays up before the next problem.
    pub feedback_ms: u64,
    pub max_answer_digits: usize,
    pub window: WindowConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            autosave_debounce_ms: 1000,
            log_filter: "info".to_string(),
            feedback_ms: 2000,
            max_answer_digits: 4,
            window: WindowConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 560.0,
            height: 720.0,
        }
    }
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        project_dirs().map(|d| d.config_dir().join("config.toml"))
    }

    /// A missing file gives the defaults. A file that can't be parsed is an error.
    pub fn load() -> anyhow::Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Writes the current config, but only if no file exists yet.
    pub fn save_if_missing(&self) -> anyhow::Result<()> {
        match Self::config_path() {
            Some(path) if !path.exists() => self.save_to(&path),
            _ => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
