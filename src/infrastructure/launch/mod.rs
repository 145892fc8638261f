//! Built-in tweaker and launch target
//!
//! `HostTweaker` is the default primary tweaker. It forwards the command
//! arguments and names `HostMain`, which loads the configuration, runs the
//! plugin lifecycle and waits for Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use crate::application::errors::LaunchError;
use crate::application::launch::{
    Blackboard, Catalog, LaunchTarget, LoadingContext, Tweaker, DEFAULT_TWEAKER,
};
use crate::application::services::HostClient;
use crate::infrastructure::config::Config;
use crate::infrastructure::plugins::{LibraryDiscovery, MemoryRegistry};

pub const HOST_TWEAKER: &str = DEFAULT_TWEAKER;
pub const HOST_MAIN: &str = "kookbc.host.Main";

/// Comma separated tweaker names the host tweaker cascades into
pub const TWEAKERS_ENV: &str = "KOOKBC_TWEAKERS";

/// Blackboard key the host tweaker records itself under
pub const LAUNCHER_KEY: &str = "kookbc.launcher";

/// Catalog holding the built-in units
pub fn builtin_catalog() -> Catalog {
    Catalog::new()
        .with_tweaker(HOST_TWEAKER, HostTweaker::from_env)
        .with_target(HOST_MAIN, || HostMain)
}

#[derive(Debug, Default)]
pub struct HostTweaker {
    args: Vec<String>,
    cascade: Vec<String>,
}

impl HostTweaker {
    /// Tweaker that also queues the names listed in `KOOKBC_TWEAKERS`
    pub fn from_env() -> Self {
        let cascade = std::env::var(TWEAKERS_ENV)
            .map(|list| parse_tweaker_list(&list))
            .unwrap_or_default();
        Self::with_cascade(cascade)
    }

    pub fn with_cascade(cascade: Vec<String>) -> Self {
        Self {
            args: Vec::new(),
            cascade,
        }
    }
}

impl Tweaker for HostTweaker {
    fn accept_options(&mut self, args: &[String]) {
        self.args = args.to_vec();
    }

    fn inject(
        &mut self,
        _loader: &mut LoadingContext,
        blackboard: &mut Blackboard,
    ) -> Result<(), LaunchError> {
        blackboard.set(LAUNCHER_KEY, HOST_TWEAKER);
        for name in &self.cascade {
            info!("Queueing tweak class {} from {}", name, TWEAKERS_ENV);
            blackboard.push_tweaker(name.clone());
        }
        Ok(())
    }

    fn launch_target(&self) -> Option<String> {
        Some(HOST_MAIN.to_string())
    }

    fn launch_arguments(&self) -> Vec<String> {
        self.args.clone()
    }
}

fn parse_tweaker_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Arguments understood by the host entry point
#[derive(Parser, Debug)]
#[command(name = "kookbc", no_binary_name = true)]
pub struct HostArgs {
    /// Config file path
    #[arg(short, long, default_value = "config.yml")]
    pub config: PathBuf,

    /// Plugin directory (overrides config)
    #[arg(long)]
    pub plugins: Option<PathBuf>,

    /// Run without any plugins
    #[arg(long)]
    pub no_plugins: bool,

    /// Bot token (overrides config)
    #[arg(short, long)]
    pub token: Option<String>,
}

impl HostArgs {
    /// Load the config file (or the environment when missing) and apply overrides
    pub fn resolve_config(&self) -> Config {
        let mut config = if self.config.exists() {
            Config::load(&self.config).unwrap_or_else(|e| {
                warn!("Failed to load config: {}, using defaults", e);
                Config::load_env()
            })
        } else {
            Config::load_env()
        };

        if let Some(token) = &self.token {
            config.bot.token = Some(token.clone());
        }
        if let Some(dir) = &self.plugins {
            config.plugins.directory = Some(dir.clone());
        }
        if self.no_plugins {
            config.plugins.enabled = false;
        }
        config
    }
}

/// Create the configured plugin directory when it is missing
fn prepare_plugin_directory(config: &Config) -> std::io::Result<Option<PathBuf>> {
    let Some(dir) = config.plugin_directory() else {
        return Ok(None);
    };
    if !dir.exists() {
        info!("Creating plugin directory {}", dir.display());
        std::fs::create_dir_all(dir)?;
    }
    Ok(Some(dir.to_path_buf()))
}

/// Entry point of the host application
#[derive(Debug, Default)]
pub struct HostMain;

impl HostMain {
    fn fail(reason: impl ToString) -> LaunchError {
        LaunchError::Target {
            name: HOST_MAIN.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl LaunchTarget for HostMain {
    fn launch(&self, args: &[String]) -> Result<(), LaunchError> {
        let args = HostArgs::try_parse_from(args).map_err(Self::fail)?;
        let config = args.resolve_config();

        if config.bot.token.is_none() {
            warn!("No bot token configured");
        }

        let plugins_dir = prepare_plugin_directory(&config).map_err(Self::fail)?;
        let mut client = HostClient::new(
            config.bot.name.clone(),
            plugins_dir,
            Arc::new(LibraryDiscovery::new()),
            Arc::new(MemoryRegistry::new()),
        )
        .map_err(Self::fail)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Self::fail)?;

        client.start();

        if let Err(e) = runtime.block_on(tokio::signal::ctrl_c()) {
            warn!("Unable to listen for shutdown signal: {}", e);
        }

        client.shutdown();
        Ok(())
    }
}
