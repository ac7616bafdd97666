//! Configuration handling for Filed Recipes
//!
//! Configuration is read from `config.toml` in the per-user config
//! directory (e.g. `~/.config/filed-recipes/config.toml` on Linux).
//! Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Recipe file used when nothing else is configured
pub const DEFAULT_RECIPES_FILE: &str = "recipes.txt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Recipe file to open (relative paths resolve against the working directory)
    pub recipes_file: PathBuf,

    /// Wait for a key press between recipes when showing all of them
    pub pause_between_recipes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recipes_file: PathBuf::from(DEFAULT_RECIPES_FILE),
            pause_between_recipes: true,
        }
    }
}

impl Config {
    /// Returns the per-user config directory
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("se", "filedrecipes", "filed-recipes")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads configuration from the default location, or defaults if absent
    pub fn load() -> Result<Self> {
        match Self::config_dir() {
            Some(dir) => Self::load_from(&dir.join("config.toml")),
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from a specific file, or defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
