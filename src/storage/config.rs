//! Configuration handling for bottle
//!
//! Configuration is stored in `~/.config/bottle/config.toml` (or the
//! platform equivalent). Every setting is optional:
//!
//! ```toml
//! data_dir = "/home/me/bottles"   # where bottles.jsonl lives
//! editor = "nano"                 # overrides $VISUAL / $EDITOR
//! key = "my own passphrase"       # obfuscation passphrase
//! color = false                   # plain text output
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Codec, DEFAULT_KEY};

use super::BottleStore;

const CONFIG_FILE: &str = "config.toml";
const DEFAULT_EDITOR: &str = "vi";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Could not determine a home directory for bottle data")]
    NoHome,
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the bottle collection
    pub data_dir: Option<PathBuf>,

    /// Editor command for composing messages
    pub editor: Option<String>,

    /// Obfuscation passphrase (changing it makes existing bottles unreadable)
    pub key: Option<String>,

    /// Colored terminal output
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            editor: None,
            key: None,
            color: true,
        }
    }
}

impl Config {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("dev", "bottle", "bottle")
    }

    /// Returns the global config directory
    pub fn config_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns the per-user data directory used when none is configured
    pub fn default_data_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Loads configuration from the default location
    pub fn load() -> Result<Self> {
        match Self::config_dir() {
            Some(dir) => Self::load_from(&dir.join(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from a specific file; a missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if matches!(&self.key, Some(key) if key.is_empty()) {
            return Err(ConfigError::Invalid("key must not be empty".to_string()));
        }
        if matches!(&self.editor, Some(editor) if editor.trim().is_empty()) {
            return Err(ConfigError::Invalid("editor must not be empty".to_string()));
        }
        Ok(())
    }

    /// Applies the `--data-dir` / `BOTTLE_DATA_DIR` override
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if data_dir.is_some() {
            self.data_dir = data_dir;
        }
        self
    }

    /// Resolves the data directory, creating it if needed
    pub fn data_dir(&self) -> Result<PathBuf> {
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => Self::default_data_dir().ok_or(ConfigError::NoHome)?,
        };

        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;

        Ok(dir)
    }

    /// Opens the bottle store in the configured data directory
    pub fn store(&self) -> Result<BottleStore> {
        Ok(BottleStore::in_dir(&self.data_dir()?))
    }

    /// Builds the message codec from the configured passphrase
    pub fn codec(&self) -> Result<Codec> {
        let key = self.key.as_deref().unwrap_or(DEFAULT_KEY);
        Codec::new(key).context("Invalid obfuscation key")
    }

    /// Editor command: config, then `$VISUAL`, then `$EDITOR`, then `vi`
    pub fn effective_editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| non_empty_env("VISUAL"))
            .or_else(|| non_empty_env("EDITOR"))
            .unwrap_or_else(|| DEFAULT_EDITOR.to_string())
    }

    /// Whether to color output, honoring `NO_COLOR`
    pub fn use_color(&self) -> bool {
        self.color && non_empty_env("NO_COLOR").is_none()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config::default();

        assert!(config.data_dir.is_none());
        assert!(config.key.is_none());
        assert!(config.color);
    }

    #[test]
    fn parse_config() {
        let toml = r#"
data_dir = "/tmp/bottles"
editor = "nano"
key = "secret"
color = false
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/bottles")));
        assert_eq!(config.editor, Some("nano".to_string()));
        assert_eq!(config.key, Some("secret".to_string()));
        assert!(!config.color);
        assert_eq!(config.effective_editor(), "nano");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: Config = toml::from_str("editor = \"code --wait\"").unwrap();
        assert!(config.color);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert!(config.color);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "color = \"maybe\"\n[[[").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn empty_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "key = \"\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("key must not be empty"));
    }

    #[test]
    fn data_dir_override_creates_directory() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a").join("b");

        let config = Config::default().with_data_dir(Some(target.clone()));
        assert_eq!(config.data_dir().unwrap(), target);
        assert!(target.is_dir());
        assert_eq!(config.store().unwrap().path(), target.join("bottles.jsonl"));
    }

    #[test]
    fn none_override_keeps_configured_dir() {
        let config = Config {
            data_dir: Some(PathBuf::from("/configured")),
            ..Config::default()
        }
        .with_data_dir(None);
        assert_eq!(config.data_dir, Some(PathBuf::from("/configured")));
    }

    #[test]
    fn custom_key_changes_encoding() {
        let custom = Config {
            key: Some("another key".to_string()),
            ..Config::default()
        };
        let default = Config::default();

        let token = custom.codec().unwrap().encode("hi");
        assert_ne!(token, default.codec().unwrap().encode("hi"));
        assert_eq!(custom.codec().unwrap().decode(&token).unwrap(), "hi");
    }
}
