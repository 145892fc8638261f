//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::application::errors::ConfigError;

/// Host configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub plugins: PluginsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct PluginsConfig {
    pub enabled: bool,
    pub directory: Option<PathBuf>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "kookbc".to_string(),
            token: None,
        }
    }
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: Some(PathBuf::from("plugins")),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn load_env() -> Self {
        Config::default().with_env()
    }

    /// Apply `BOT_TOKEN` and `KOOKBC_PLUGINS_DIR` on top of this config
    pub fn with_env(mut self) -> Self {
        if let Ok(token) = std::env::var("BOT_TOKEN") {
            self.bot.token = Some(token);
        }

        if let Ok(dir) = std::env::var("KOOKBC_PLUGINS_DIR") {
            self.plugins.directory = if dir.is_empty() { None } else { Some(PathBuf::from(dir)) };
        }

        self
    }

    /// Directory to scan for plugins, `None` when plugins are switched off
    pub fn plugin_directory(&self) -> Option<&Path> {
        if !self.plugins.enabled {
            return None;
        }
        self.plugins.directory.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "bot:\n  token: abc\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.bot.token.as_deref(), Some("abc"));
        assert_eq!(config.bot.name, "kookbc");
        assert_eq!(config.plugin_directory(), Some(Path::new("plugins")));
    }

    #[test]
    fn test_disabled_plugins_have_no_directory() {
        let config: Config = serde_yaml::from_str("plugins:\n  enabled: false\n").unwrap();
        assert_eq!(config.plugin_directory(), None);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(matches!(Config::load("/nonexistent/config.yml"), Err(ConfigError::Parse(_))));
    }
}
