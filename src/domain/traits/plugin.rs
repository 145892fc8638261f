use crate::application::errors::PluginResult;

/// Plugin trait - the hooks a runtime extension unit exposes
///
/// Every hook has a no-op default so a plugin only implements what it needs.
pub trait Plugin: Send + Sync {
    /// Called once after discovery, before any plugin is enabled
    fn on_load(&self) -> PluginResult<()> {
        Ok(())
    }

    /// Called with the parsed `config.yml` of the plugin, or `None` when absent
    fn on_config(&self, _config: Option<&serde_yaml::Value>) -> PluginResult<()> {
        Ok(())
    }

    fn on_enable(&self) -> PluginResult<()> {
        Ok(())
    }

    fn on_disable(&self) -> PluginResult<()> {
        Ok(())
    }
}
