//! Application services - Plugin lifecycle orchestration

pub mod client;
pub mod dependency;
pub mod plugin_service;

pub use client::HostClient;
pub use dependency::{resolve_load_order, LoadOrder};
pub use plugin_service::PluginService;
