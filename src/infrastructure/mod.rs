//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Launch: Built-in tweaker and host entry point
//! - Plugins: Shared-library discovery and the plugin registry

pub mod config;
pub mod launch;
pub mod plugins;
