use std::sync::Arc;

use crate::application::errors::PluginResult;
use crate::domain::entities::LoadedPlugin;

/// Registry trait - the set of plugins known to the running host
pub trait PluginRegistry: Send + Sync {
    /// Enable a plugin.
    ///
    /// Fails with `PluginError::UnknownDependency` when a hard dependency is
    /// not known and enabled. A failing enable hook is not an error here: the
    /// plugin simply stays disabled.
    fn enable(&self, plugin: &Arc<LoadedPlugin>) -> PluginResult<()>;

    /// Add a plugin to the known list so dependents can resolve it
    fn add(&self, plugin: Arc<LoadedPlugin>);

    /// Disable and forget every known plugin
    fn clear(&self);

    /// All known plugins, in the order they were added
    fn plugins(&self) -> Vec<Arc<LoadedPlugin>>;

    fn get(&self, name: &str) -> Option<Arc<LoadedPlugin>>;
}
