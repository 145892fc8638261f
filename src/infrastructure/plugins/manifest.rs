//! Plugin manifest definition

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::application::errors::PluginError;
use crate::domain::entities::PluginDescription;

/// File name of the manifest inside each plugin directory
pub const MANIFEST_FILE: &str = "plugin.yml";

/// Contents of `plugin.yml`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginManifest {
    #[serde(flatten)]
    pub description: PluginDescription,

    /// Path to the shared library, relative to the plugin directory
    pub library: Option<PathBuf>,
}

impl PluginManifest {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PluginError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| PluginError::Load(format!("Failed to read manifest {}: {}", path.display(), e)))?;

        Self::parse(&content)
            .map_err(|e| PluginError::Load(format!("Failed to parse manifest {}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Library path inside `plugin_dir`, defaulting to the platform name for `name`
    pub fn library_path(&self, plugin_dir: &Path) -> PathBuf {
        match &self.library {
            Some(lib) => plugin_dir.join(lib),
            None => plugin_dir.join(libloading::library_filename(&self.description.name)),
        }
    }
}
