//! Configuration management for quill.
//!
//! Configuration is loaded from multiple sources with precedence:
//! 1. Environment variables (QUILL_*, GROQ_API_KEY)
//! 2. Config file ($QUILL_CONFIG or the platform data dir's config.toml)
//! 3. Default values

use anyhow::{Context, Result};
use directories::ProjectDirs;
use quill_core::Database;
use quill_core::llm::ClientConfig;
use quill_sdk::{SDKConfig, UserProfile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Who is writing
    pub user: UserConfig,

    /// Text generation provider
    pub provider: ClientConfig,

    /// Paths
    pub paths: PathsConfig,

    /// Pipeline tuning, passed to the SDK as-is
    pub engine: SDKConfig,

    /// Profile used for generation
    pub profile: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Default user ID when `--user` is not given
    pub id: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// SQLite database file. Defaults to ~/.quill/quill.db
    pub database: Option<PathBuf>,
}

fn default_user_id() -> String {
    "default".to_string()
}

fn default_data_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("dev", "quill", "quill") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".quill")
    }
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load a config file, falling back to defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply environment overrides read through `var`.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = var("QUILL_DATABASE_PATH") {
            self.paths.database = Some(PathBuf::from(path));
        }
        if let Some(user) = var("QUILL_USER_ID") {
            self.user.id = user;
        }
        if let Some(key) = var("QUILL_API_KEY").or_else(|| var("GROQ_API_KEY")) {
            self.provider.api_key = Some(key);
        }
        if let Some(model) = var("QUILL_MODEL") {
            self.provider.model = model;
        }
        if let Some(url) = var("QUILL_BASE_URL") {
            self.provider.base_url = url;
        }
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        match std::env::var("QUILL_CONFIG") {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => default_data_dir().join("config.toml"),
        }
    }

    /// Resolved database file
    pub fn database_path(&self) -> PathBuf {
        self.paths
            .database
            .clone()
            .unwrap_or_else(Database::find_database)
    }

    /// SDK configuration with the resolved database path
    pub fn sdk_config(&self) -> SDKConfig {
        SDKConfig {
            database_path: self.database_path(),
            ..self.engine.clone()
        }
    }
}
