//! Plugin registry - Tracks the plugins known to the host

use std::sync::{Arc, RwLock};

use crate::application::errors::{PluginError, PluginResult};
use crate::domain::entities::LoadedPlugin;
use crate::domain::traits::PluginRegistry;

/// In-memory registry keeping plugins in the order they were added
pub struct MemoryRegistry {
    plugins: RwLock<Vec<Arc<LoadedPlugin>>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self {
            plugins: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginRegistry for MemoryRegistry {
    fn enable(&self, plugin: &Arc<LoadedPlugin>) -> PluginResult<()> {
        if plugin.is_enabled() {
            return Ok(());
        }
        if !plugin.is_loaded() {
            return Err(PluginError::Enable(format!("{} has not been loaded", plugin.name())));
        }

        for dependency in &plugin.description().depend {
            let satisfied = self.get(dependency).is_some_and(|dep| dep.is_enabled());
            if !satisfied {
                return Err(PluginError::UnknownDependency {
                    plugin: plugin.name().to_string(),
                    dependency: dependency.clone(),
                });
            }
        }

        tracing::info!("Enabling {}", plugin.description());
        plugin.set_enabled(true);
        Ok(())
    }

    fn add(&self, plugin: Arc<LoadedPlugin>) {
        let Ok(mut plugins) = self.plugins.write() else {
            tracing::error!("Plugin registry lock poisoned, {} not added", plugin.name());
            return;
        };

        if !plugins.iter().any(|p| p.name() == plugin.name()) {
            plugins.push(plugin);
        }
    }

    fn clear(&self) {
        let drained: Vec<Arc<LoadedPlugin>> = match self.plugins.write() {
            Ok(mut plugins) => plugins.drain(..).collect(),
            Err(_) => {
                tracing::error!("Plugin registry lock poisoned, nothing cleared");
                return;
            }
        };

        // Dependents were added after their dependencies
        for plugin in drained.iter().rev() {
            if plugin.is_enabled() {
                tracing::info!("Disabling {}", plugin.description());
                plugin.set_enabled(false);
            }
        }
    }

    fn plugins(&self) -> Vec<Arc<LoadedPlugin>> {
        self.plugins.read().map(|p| p.clone()).unwrap_or_default()
    }

    fn get(&self, name: &str) -> Option<Arc<LoadedPlugin>> {
        self.plugins
            .read()
            .ok()?
            .iter()
            .find(|p| p.name() == name)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::PluginDescription;
    use crate::domain::traits::Plugin;
    use std::sync::Mutex;

    struct Recorder {
        name: String,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Plugin for Recorder {
        fn on_disable(&self) -> PluginResult<()> {
            self.log.lock().unwrap().push(self.name.clone());
            Ok(())
        }
    }

    fn plugin(desc: PluginDescription, log: &Arc<Mutex<Vec<String>>>) -> Arc<LoadedPlugin> {
        let name = desc.name.clone();
        let plugin = LoadedPlugin::new(desc, Recorder { name, log: log.clone() });
        plugin.load().unwrap();
        Arc::new(plugin)
    }

    #[test]
    fn test_enable_requires_load() {
        let registry = MemoryRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let p = LoadedPlugin::new(
            PluginDescription::new("raw", "1.0"),
            Recorder { name: "raw".to_string(), log },
        );

        let err = registry.enable(&Arc::new(p)).unwrap_err();
        assert!(matches!(err, PluginError::Enable(ref reason) if reason.contains("raw")));
    }

    #[test]
    fn test_enable_rejects_unknown_dependency() {
        let registry = MemoryRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let p = plugin(PluginDescription::new("p1", "1.0").with_depend("p2"), &log);

        let err = registry.enable(&p).unwrap_err();
        assert!(matches!(err, PluginError::UnknownDependency { ref dependency, .. } if dependency == "p2"));
        assert!(!p.is_enabled());
    }

    #[test]
    fn test_soft_dependency_is_not_required() {
        let registry = MemoryRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let p = plugin(PluginDescription::new("p1", "1.0").with_soft_depend("p2"), &log);

        registry.enable(&p).unwrap();
        assert!(p.is_enabled());
    }

    #[test]
    fn test_enable_with_known_dependency() {
        let registry = MemoryRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let base = plugin(PluginDescription::new("base", "1.0"), &log);
        let top = plugin(PluginDescription::new("top", "1.0").with_depend("base"), &log);

        registry.enable(&base).unwrap();
        registry.add(base);
        registry.enable(&top).unwrap();
        assert!(top.is_enabled());
    }

    #[test]
    fn test_add_ignores_duplicates() {
        let registry = MemoryRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let p = plugin(PluginDescription::new("p", "1.0"), &log);

        registry.add(p.clone());
        registry.add(p);
        assert_eq!(registry.plugins().len(), 1);
    }

    #[test]
    fn test_clear_disables_in_reverse_order() {
        let registry = MemoryRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for name in ["a", "b", "c"] {
            let p = plugin(PluginDescription::new(name, "1.0"), &log);
            registry.enable(&p).unwrap();
            registry.add(p);
        }

        registry.clear();
        assert!(registry.plugins().is_empty());
        assert_eq!(*log.lock().unwrap(), vec!["c", "b", "a"]);
    }
}
