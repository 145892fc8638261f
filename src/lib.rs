//! kookbc - bot client host
//!
//! Bootstraps through a chain of tweakers, then runs a plugin lifecycle that
//! keeps one failing plugin from taking the others down.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::errors::{ConfigError, HostError, LaunchError, PluginError, PluginResult};
pub use application::launch::{Blackboard, Catalog, LaunchReport, LaunchTarget, Launcher, LoadingContext, Tweaker};
pub use application::services::{HostClient, PluginService};
pub use domain::entities::{LoadedPlugin, PluginDescription};
pub use domain::traits::{Plugin, PluginDiscovery, PluginRegistry};
