//! Plugin collaborators for kookbc
//!
//! Plugins are dynamically loaded shared libraries that extend the host.
//! Each plugin directory carries a `plugin.yml` manifest next to its library.

pub mod loader;
pub mod manifest;
pub mod registry;

pub use loader::{LibraryDiscovery, PluginCreateFn, PLUGIN_CREATE_SYMBOL};
pub use manifest::{PluginManifest, MANIFEST_FILE};
pub use registry::MemoryRegistry;
