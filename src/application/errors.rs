//! Application layer errors

use thiserror::Error;

/// General host errors
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),
}

/// Bootstrap errors. Every one of these is fatal to the process.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("No tweaker registered under '{0}'")]
    NotFound(String),

    #[error("'{name}' is not a {expected}")]
    WrongKind { name: String, expected: &'static str },

    #[error("No tweak class was given, nothing to launch")]
    NoTweakers,

    #[error("Tweaker '{name}' failed: {reason}")]
    Tweaker { name: String, reason: String },

    #[error("Launch target '{name}' failed: {reason}")]
    Target { name: String, reason: String },
}

/// Plugin lifecycle errors
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Load error: {0}")]
    Load(String),

    #[error("Plugin '{plugin}' requires unknown dependency '{dependency}'")]
    UnknownDependency { plugin: String, dependency: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Enable error: {0}")]
    Enable(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type PluginResult<T> = Result<T, PluginError>;
