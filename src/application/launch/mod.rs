//! Bootstrap chain - tweakers run before the host itself starts
//!
//! A launch starts from a list of tweaker names. Each tweaker is resolved
//! through the [`LoadingContext`], may push more names onto the shared
//! [`Blackboard`], may register transformers, and contributes launch
//! arguments. The first tweaker instantiated names the launch target.

pub mod blackboard;
pub mod loader;
pub mod runner;

pub use blackboard::Blackboard;
pub use loader::{namespace_of, Catalog, LoadingContext, Route, RouteTable, Transformer, Unit};
pub use runner::{LaunchReport, Launcher, DEFAULT_TWEAKER};

use crate::application::errors::LaunchError;

/// Bootstrap-time extension unit
pub trait Tweaker {
    /// Receives the free-form, non-option command arguments
    fn accept_options(&mut self, args: &[String]);

    /// Register transformers or exclusions, and push further tweaker names
    fn inject(
        &mut self,
        loader: &mut LoadingContext,
        blackboard: &mut Blackboard,
    ) -> Result<(), LaunchError>;

    /// Name of the launch target. Only asked of the primary tweaker.
    fn launch_target(&self) -> Option<String>;

    /// Arguments this tweaker contributes to the launch target
    fn launch_arguments(&self) -> Vec<String>;
}

/// Entry point handed control once the bootstrap chain completes
pub trait LaunchTarget {
    fn launch(&self, args: &[String]) -> Result<(), LaunchError>;
}
