//! Plugin lifecycle - discovery, ordering, load, enable and teardown
//!
//! A failing plugin is logged and dropped; it never stops the others.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::dependency::resolve_load_order;
use crate::application::errors::PluginError;
use crate::domain::entities::{LoadedPlugin, PluginDescription};
use crate::domain::traits::{PluginDiscovery, PluginRegistry};

/// Drives every discovered plugin towards the enabled state
pub struct PluginService {
    directory: Option<PathBuf>,
    discovery: Arc<dyn PluginDiscovery>,
    registry: Arc<dyn PluginRegistry>,
    loaded: Option<Vec<Arc<LoadedPlugin>>>,
    active: Vec<Arc<LoadedPlugin>>,
}

impl PluginService {
    /// `directory` of `None` means no plugins at all, only the host API
    pub fn new(
        directory: Option<PathBuf>,
        discovery: Arc<dyn PluginDiscovery>,
        registry: Arc<dyn PluginRegistry>,
    ) -> Self {
        Self {
            directory,
            discovery,
            registry,
            loaded: None,
            active: Vec::new(),
        }
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    pub fn registry(&self) -> &Arc<dyn PluginRegistry> {
        &self.registry
    }

    /// Plugins that passed every phase
    pub fn active(&self) -> &[Arc<LoadedPlugin>] {
        &self.active
    }

    /// Discover, sort and load plugins.
    ///
    /// Discovery runs once per service; later calls return the cached
    /// survivors of the load phase.
    pub fn load_plugins(&mut self) -> Vec<Arc<LoadedPlugin>> {
        let Some(directory) = self.directory.clone() else {
            return Vec::new();
        };
        if let Some(loaded) = &self.loaded {
            return loaded.clone();
        }

        let candidates = match self.discovery.discover(&directory) {
            Ok(candidates) => unique_by_name(candidates),
            Err(e) => {
                error!("Unable to discover plugins in {}: {}", directory.display(), e);
                Vec::new()
            }
        };

        let descriptions: Vec<&PluginDescription> =
            candidates.iter().map(|p| p.description()).collect();
        let order = resolve_load_order(&descriptions);
        for cycle in &order.cycles {
            warn!("Circular dependency detected among plugins: {}", cycle.join(", "));
        }

        let mut slots: Vec<Option<LoadedPlugin>> = candidates.into_iter().map(Some).collect();
        let mut loaded = Vec::with_capacity(slots.len());

        for idx in order.order {
            let Some(plugin) = slots[idx].take() else {
                continue;
            };

            info!("Loading {}", plugin.description());
            match plugin.load() {
                Ok(()) => loaded.push(Arc::new(plugin)),
                Err(e) => error!("Unable to load plugin {}: {}", plugin.name(), e),
            }
        }

        self.loaded = Some(loaded.clone());
        loaded
    }

    /// Enable loaded plugins in order and record the ones that made it
    pub fn enable_plugins(&mut self, plugins: Vec<Arc<LoadedPlugin>>) {
        for plugin in plugins {
            if self.active.iter().any(|p| Arc::ptr_eq(p, &plugin)) {
                continue;
            }

            if let Err(e) = plugin.reload_config() {
                error!("Unable to load configuration of {}: {}", plugin.name(), e);
            }

            match self.registry.enable(&plugin) {
                Ok(()) => {}
                Err(e @ PluginError::UnknownDependency { .. }) => {
                    error!(
                        "Unable to enable plugin {} because unknown dependency detected: {}",
                        plugin.name(),
                        e
                    );
                    self.forget(&plugin);
                    continue;
                }
                Err(e) => {
                    error!("Unable to enable plugin {}: {}", plugin.name(), e);
                    self.forget(&plugin);
                    continue;
                }
            }

            if !plugin.is_enabled() {
                self.forget(&plugin);
                continue;
            }

            self.registry.add(plugin.clone());
            self.active.push(plugin);
        }
    }

    /// Load and enable everything. Returns the active set.
    pub fn start(&mut self) -> &[Arc<LoadedPlugin>] {
        let loaded = self.load_plugins();
        self.enable_plugins(loaded);
        &self.active
    }

    /// Disable every active plugin through the registry and drop all state.
    ///
    /// Discovery is not run again afterwards.
    pub fn shutdown(&mut self) {
        if self.active.is_empty() {
            debug!("No active plugins to tear down");
            return;
        }

        info!("Disabling {} plugins", self.active.len());
        self.registry.clear();
        self.active.clear();
        self.loaded = Some(Vec::new());
    }

    fn forget(&mut self, plugin: &Arc<LoadedPlugin>) {
        if let Some(loaded) = &mut self.loaded {
            loaded.retain(|p| !Arc::ptr_eq(p, plugin));
        }
    }
}

fn unique_by_name(candidates: Vec<LoadedPlugin>) -> Vec<LoadedPlugin> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|plugin| {
            let fresh = seen.insert(plugin.name().to_string());
            if !fresh {
                warn!("Duplicate plugin name {}, skipping", plugin.name());
            }
            fresh
        })
        .collect()
}
