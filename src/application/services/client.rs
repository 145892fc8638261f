use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use super::PluginService;
use crate::application::errors::{ConfigError, HostError};
use crate::domain::entities::LoadedPlugin;
use crate::domain::traits::{PluginDiscovery, PluginRegistry};

/// The running host: owns the plugin lifecycle between start and shutdown
pub struct HostClient {
    name: String,
    plugins: PluginService,
    running: bool,
}

impl HostClient {
    /// Fails when `plugins_dir` is given but is not an existing directory
    pub fn new(
        name: impl Into<String>,
        plugins_dir: Option<PathBuf>,
        discovery: Arc<dyn PluginDiscovery>,
        registry: Arc<dyn PluginRegistry>,
    ) -> Result<Self, HostError> {
        if let Some(dir) = &plugins_dir {
            if !dir.is_dir() {
                return Err(ConfigError::InvalidValue(format!(
                    "plugin folder {} is not a directory",
                    dir.display()
                ))
                .into());
            }
        }

        Ok(Self {
            name: name.into(),
            plugins: PluginService::new(plugins_dir, discovery, registry),
            running: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn plugins(&self) -> &PluginService {
        &self.plugins
    }

    /// Bring every plugin that can make it to the enabled state
    pub fn start(&mut self) -> &[Arc<LoadedPlugin>] {
        info!("Starting {}", self.name);
        self.running = true;

        let active = self.plugins.start();
        info!(
            "Enabled {} plugins: {}",
            active.len(),
            active.iter().map(|p| p.name()).collect::<Vec<_>>().join(", ")
        );
        info!("Done! {} is running", self.name);
        active
    }

    /// Names of every plugin the registry knows about
    pub fn plugin_names(&self) -> Vec<String> {
        self.plugins
            .registry()
            .plugins()
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Tear the plugins down. Calling this again does nothing.
    pub fn shutdown(&mut self) {
        debug!("Client shutdown request received");
        if !self.running {
            debug!("The client has already stopped");
            return;
        }
        self.running = false;

        info!("Stopping client");
        self.plugins.shutdown();
        info!("Client stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::PluginResult;
    use crate::domain::entities::PluginDescription;
    use crate::domain::traits::Plugin;
    use crate::infrastructure::plugins::MemoryRegistry;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountDisable(Arc<AtomicUsize>);

    impl Plugin for CountDisable {
        fn on_disable(&self) -> PluginResult<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct One(Arc<AtomicUsize>);

    impl PluginDiscovery for One {
        fn discover(&self, _directory: &Path) -> PluginResult<Vec<LoadedPlugin>> {
            Ok(vec![LoadedPlugin::new(
                PluginDescription::new("one", "1.0"),
                CountDisable(self.0.clone()),
            )])
        }
    }

    #[test]
    fn test_rejects_file_as_plugin_folder() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = HostClient::new(
            "test",
            Some(file.path().to_path_buf()),
            Arc::new(One(Arc::new(AtomicUsize::new(0)))),
            Arc::new(MemoryRegistry::new()),
        );
        assert!(matches!(result, Err(HostError::Config(ConfigError::InvalidValue(_)))));
    }

    #[test]
    fn test_rejects_missing_plugin_folder() {
        let dir = tempfile::tempdir().unwrap();
        let result = HostClient::new(
            "test",
            Some(dir.path().join("absent")),
            Arc::new(One(Arc::new(AtomicUsize::new(0)))),
            Arc::new(MemoryRegistry::new()),
        );
        assert!(matches!(result, Err(HostError::Config(ConfigError::InvalidValue(_)))));
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let disables = Arc::new(AtomicUsize::new(0));
        let dir = tempfile::tempdir().unwrap();
        let mut client = HostClient::new(
            "test",
            Some(dir.path().to_path_buf()),
            Arc::new(One(disables.clone())),
            Arc::new(MemoryRegistry::new()),
        )
        .unwrap();

        assert_eq!(client.start().len(), 1);
        assert_eq!(client.plugin_names(), vec!["one"]);

        client.shutdown();
        client.shutdown();

        assert!(!client.is_running());
        assert_eq!(disables.load(Ordering::SeqCst), 1);
        assert!(client.plugin_names().is_empty());
    }
}
