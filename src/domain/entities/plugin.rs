use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::application::errors::{PluginError, PluginResult};
use crate::domain::traits::Plugin;

/// Name of the per-plugin configuration file inside its data folder
pub const CONFIG_FILE: &str = "config.yml";

/// Declared identity and relations of a plugin
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginDescription {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    /// Plugins that must be enabled before this one
    #[serde(default)]
    pub depend: Vec<String>,
    /// Plugins that are ordered before this one when present
    #[serde(default)]
    pub soft_depend: Vec<String>,
}

impl PluginDescription {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
            authors: Vec::new(),
            depend: Vec::new(),
            soft_depend: Vec::new(),
        }
    }

    pub fn with_depend(mut self, name: impl Into<String>) -> Self {
        self.depend.push(name.into());
        self
    }

    pub fn with_soft_depend(mut self, name: impl Into<String>) -> Self {
        self.soft_depend.push(name.into());
        self
    }
}

impl fmt::Display for PluginDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

/// A plugin instance together with its description and lifecycle flags.
///
/// The flags use atomics so that a unit can be shared through `Arc` between
/// the lifecycle manager and the registry.
pub struct LoadedPlugin {
    description: PluginDescription,
    instance: Box<dyn Plugin>,
    data_folder: Option<PathBuf>,
    loaded: AtomicBool,
    enabled: AtomicBool,
}

impl LoadedPlugin {
    pub fn new(description: PluginDescription, instance: impl Plugin + 'static) -> Self {
        Self::from_boxed(description, Box::new(instance))
    }

    pub fn from_boxed(description: PluginDescription, instance: Box<dyn Plugin>) -> Self {
        Self {
            description,
            instance,
            data_folder: None,
            loaded: AtomicBool::new(false),
            enabled: AtomicBool::new(false),
        }
    }

    pub fn with_data_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.data_folder = Some(folder.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.description.name
    }

    pub fn description(&self) -> &PluginDescription {
        &self.description
    }

    pub fn data_folder(&self) -> Option<&Path> {
        self.data_folder.as_deref()
    }

    /// Run the load hook. The unit is marked loaded only on success.
    pub fn load(&self) -> PluginResult<()> {
        self.instance.on_load()?;
        self.loaded.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// Read `config.yml` from the data folder (if any) and hand it to the plugin.
    pub fn reload_config(&self) -> PluginResult<()> {
        let config = match self.data_folder.as_deref().map(|d| d.join(CONFIG_FILE)) {
            Some(path) if path.is_file() => {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    PluginError::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                let value: serde_yaml::Value = serde_yaml::from_str(&content).map_err(|e| {
                    PluginError::Config(format!("Failed to parse {}: {}", path.display(), e))
                })?;
                Some(value)
            }
            _ => None,
        };

        self.instance.on_config(config.as_ref())
    }

    /// Switch the enabled state, running the matching hook.
    ///
    /// A failing enable hook is logged and leaves the plugin disabled.
    pub fn set_enabled(&self, enabled: bool) {
        if self.is_enabled() == enabled {
            return;
        }

        if enabled {
            match self.instance.on_enable() {
                Ok(()) => self.enabled.store(true, Ordering::SeqCst),
                Err(e) => tracing::error!("Error occurred while enabling {}: {}", self.description, e),
            }
        } else {
            self.enabled.store(false, Ordering::SeqCst);
            if let Err(e) = self.instance.on_disable() {
                tracing::error!("Error occurred while disabling {}: {}", self.description, e);
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for LoadedPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedPlugin")
            .field("description", &self.description)
            .field("loaded", &self.is_loaded())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
