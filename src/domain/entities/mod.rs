//! Domain entities - Core objects of the plugin lifecycle

pub mod plugin;

pub use plugin::{LoadedPlugin, PluginDescription, CONFIG_FILE};
