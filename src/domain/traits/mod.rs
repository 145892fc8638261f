//! Domain traits - Abstractions for plugin hooks and lifecycle collaborators

pub mod discovery;
pub mod plugin;
pub mod registry;

pub use discovery::PluginDiscovery;
pub use plugin::Plugin;
pub use registry::PluginRegistry;
