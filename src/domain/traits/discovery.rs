use std::path::Path;

use crate::application::errors::PluginResult;
use crate::domain::entities::LoadedPlugin;

/// Discovery trait - turns a plugin directory into candidate units
pub trait PluginDiscovery: Send + Sync {
    /// Scan `directory` and return the candidates in discovery order
    fn discover(&self, directory: &Path) -> PluginResult<Vec<LoadedPlugin>>;
}
