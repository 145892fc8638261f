//! Plugin loader - Discovers plugins built as shared libraries
//!
//! Every immediate subdirectory of the plugin directory holding a
//! `plugin.yml` is a candidate. Its library must export
//! `kookbc_plugin_create`, best declared with [`declare_plugin!`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};

use super::manifest::{PluginManifest, MANIFEST_FILE};
use crate::application::errors::{PluginError, PluginResult};
use crate::domain::entities::LoadedPlugin;
use crate::domain::traits::{Plugin, PluginDiscovery};

/// Symbol every plugin library must export
pub const PLUGIN_CREATE_SYMBOL: &[u8] = b"kookbc_plugin_create";

/// Function signature for plugin creation
pub type PluginCreateFn = unsafe extern "C" fn() -> *mut Box<dyn Plugin>;

/// Export a plugin constructor from a `cdylib`
#[macro_export]
macro_rules! declare_plugin {
    ($ctor:expr) => {
        #[no_mangle]
        pub extern "C" fn kookbc_plugin_create() -> *mut Box<dyn $crate::domain::traits::Plugin> {
            let plugin: Box<dyn $crate::domain::traits::Plugin> = Box::new($ctor);
            Box::into_raw(Box::new(plugin))
        }
    };
}

/// Plugin backed by a shared library.
///
/// `instance` is declared first so it is dropped before the library that
/// holds its code.
struct DynamicPlugin {
    instance: Box<dyn Plugin>,
    _library: Library,
}

impl Plugin for DynamicPlugin {
    fn on_load(&self) -> PluginResult<()> {
        self.instance.on_load()
    }

    fn on_config(&self, config: Option<&serde_yaml::Value>) -> PluginResult<()> {
        self.instance.on_config(config)
    }

    fn on_enable(&self) -> PluginResult<()> {
        self.instance.on_enable()
    }

    fn on_disable(&self) -> PluginResult<()> {
        self.instance.on_disable()
    }
}

/// Discovery over a directory of shared-library plugins
#[derive(Debug, Default)]
pub struct LibraryDiscovery;

impl LibraryDiscovery {
    pub fn new() -> Self {
        Self
    }

    /// Load a single plugin from its directory
    pub fn load_plugin(&self, path: &Path) -> PluginResult<LoadedPlugin> {
        let manifest = self.read_manifest(path)?;
        self.load_library(path, manifest)
    }

    /// Parse `plugin.yml` in `path` without touching the library
    pub fn read_manifest(&self, path: &Path) -> PluginResult<PluginManifest> {
        let manifest_path = path.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(PluginError::Load(format!(
                "Missing {} in {}",
                MANIFEST_FILE,
                path.display()
            )));
        }

        PluginManifest::from_file(&manifest_path)
    }

    /// Plugin directories under `directory` with their manifests, in name
    /// order. A manifest repeating an earlier plugin name is skipped.
    pub fn scan(&self, directory: &Path) -> PluginResult<Vec<(PathBuf, PluginManifest)>> {
        let mut found = Vec::new();

        if !directory.exists() {
            tracing::warn!("Plugin directory does not exist: {}", directory.display());
            return Ok(found);
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(directory)
            .map_err(|e| PluginError::Load(format!("Failed to read plugin directory: {}", e)))?
        {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            // Skip hidden directories
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    continue;
                }
            }

            paths.push(path);
        }

        // read_dir order is platform dependent
        paths.sort();

        let mut names = HashSet::new();
        for path in paths {
            match self.read_manifest(&path) {
                Ok(manifest) => {
                    if !names.insert(manifest.description.name.clone()) {
                        tracing::warn!(
                            "Duplicate plugin name {} in {}, skipping",
                            manifest.description.name,
                            path.display()
                        );
                        continue;
                    }
                    found.push((path, manifest));
                }
                Err(e) => {
                    tracing::warn!("Failed to load plugin from {}: {}", path.display(), e);
                }
            }
        }

        Ok(found)
    }

    fn load_library(&self, path: &Path, manifest: PluginManifest) -> PluginResult<LoadedPlugin> {
        let library_path = manifest.library_path(path);
        if !library_path.exists() {
            return Err(PluginError::Load(format!(
                "Library not found: {}",
                library_path.display()
            )));
        }

        // SAFETY: loading a library runs its initialisers; plugin libraries are trusted
        let library = unsafe {
            Library::new(&library_path)
                .map_err(|e| PluginError::Load(format!("Failed to load library: {}", e)))?
        };

        let instance = unsafe {
            let create: Symbol<PluginCreateFn> = library
                .get(PLUGIN_CREATE_SYMBOL)
                .map_err(|e| PluginError::Load(format!("Failed to find create function: {}", e)))?;

            let raw = create();
            if raw.is_null() {
                return Err(PluginError::Load("Plugin create returned null".to_string()));
            }
            // SAFETY: `declare_plugin!` hands out a pointer from `Box::into_raw`
            *Box::from_raw(raw)
        };

        tracing::debug!("Discovered plugin {} at {}", manifest.description, path.display());

        let plugin = DynamicPlugin {
            instance,
            _library: library,
        };
        Ok(LoadedPlugin::new(manifest.description, plugin).with_data_folder(path))
    }
}

impl PluginDiscovery for LibraryDiscovery {
    fn discover(&self, directory: &Path) -> PluginResult<Vec<LoadedPlugin>> {
        let mut plugins = Vec::new();

        for (path, manifest) in self.scan(directory)? {
            match self.load_library(&path, manifest) {
                Ok(plugin) => plugins.push(plugin),
                Err(e) => {
                    tracing::warn!("Failed to load plugin from {}: {}", path.display(), e);
                }
            }
        }

        Ok(plugins)
    }
}
