//! Bootstrap chain runner

use std::collections::HashSet;

use tracing::{info, warn};

use super::{namespace_of, Blackboard, LoadingContext, Tweaker};
use crate::application::errors::LaunchError;

/// Tweaker used when none is given on the command line
pub const DEFAULT_TWEAKER: &str = "kookbc.launch.HostTweaker";

/// What a completed launch did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    /// Tweakers in instantiation (and processing) order
    pub tweakers: Vec<String>,
    pub visited: HashSet<String>,
    pub primary: String,
    pub arguments: Vec<String>,
    /// Target that was invoked, if the primary named one
    pub launch_target: Option<String>,
}

/// Runs the tweaker chain and hands control to the launch target
pub struct Launcher {
    loader: LoadingContext,
}

impl Launcher {
    pub fn new(loader: LoadingContext) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &LoadingContext {
        &self.loader
    }

    /// Run the chain to a fixed point, then invoke the primary's launch target.
    ///
    /// Names are processed in passes: every pending name is instantiated
    /// first, then each new tweaker has its hooks called. Names pushed during
    /// a pass are picked up by the next one. The loop ends once a pass leaves
    /// nothing pending, so a tweaker that keeps pushing names it has never
    /// pushed before keeps the loop running forever. Nothing guards against
    /// that.
    ///
    /// Every error returned here is fatal to the process.
    pub fn launch(
        &mut self,
        tweak_names: Vec<String>,
        options: &[String],
    ) -> Result<LaunchReport, LaunchError> {
        if tweak_names.is_empty() {
            return Err(LaunchError::NoTweakers);
        }

        let mut blackboard = Blackboard::new(tweak_names);
        let mut processed: Vec<(String, Box<dyn Tweaker>)> = Vec::new();
        let mut primary: Option<String> = None;

        loop {
            let mut batch = Vec::new();

            while let Some(name) = blackboard.next_pending() {
                if !blackboard.visit(&name) {
                    warn!("Tweak class name {} has already been visited -- skipping", name);
                    continue;
                }

                info!("Loading tweak class name {}", name);
                // The tweaker's own namespace must never go through its transformers
                self.loader.add_exclusion(namespace_of(&name));
                let tweaker = self.loader.resolve_tweaker(&name)?;
                blackboard.record_tweaker(&name);

                if primary.is_none() {
                    info!("Using primary tweak class name {}", name);
                    primary = Some(name.clone());
                }
                batch.push((name, tweaker));
            }

            for (name, mut tweaker) in batch {
                info!("Calling tweak class {}", name);
                tweaker.accept_options(options);
                tweaker.inject(&mut self.loader, &mut blackboard)?;
                processed.push((name, tweaker));
            }

            if !blackboard.has_pending() {
                break;
            }
        }

        let primary = primary.ok_or(LaunchError::NoTweakers)?;
        let arguments: Vec<String> = processed
            .iter()
            .flat_map(|(_, tweaker)| tweaker.launch_arguments())
            .collect();
        blackboard.set_arguments(arguments);

        // The primary is always the first tweaker processed
        let launch_target = processed
            .first()
            .and_then(|(_, tweaker)| tweaker.launch_target())
            .filter(|target| !target.is_empty());

        let report = LaunchReport {
            tweakers: blackboard.tweakers().to_vec(),
            visited: blackboard.visited().clone(),
            primary,
            arguments: blackboard.arguments().to_vec(),
            launch_target: launch_target.clone(),
        };
        drop(blackboard);

        match launch_target {
            Some(target_name) => {
                info!("Launching wrapped target {}", target_name);
                let target = self.loader.resolve_target(&target_name)?;
                target.launch(&report.arguments)?;
            }
            None => info!("Primary tweaker {} names no launch target", report.primary),
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::launch::{Catalog, LaunchTarget};

    struct Quiet;

    impl Tweaker for Quiet {
        fn accept_options(&mut self, _args: &[String]) {}

        fn inject(&mut self, _: &mut LoadingContext, _: &mut Blackboard) -> Result<(), LaunchError> {
            Ok(())
        }

        fn launch_target(&self) -> Option<String> {
            Some(String::new())
        }

        fn launch_arguments(&self) -> Vec<String> {
            Vec::new()
        }
    }

    struct Failing;

    impl LaunchTarget for Failing {
        fn launch(&self, _args: &[String]) -> Result<(), LaunchError> {
            Err(LaunchError::Target {
                name: "t.Main".to_string(),
                reason: "boom".to_string(),
            })
        }
    }

    #[test]
    fn test_empty_name_list_is_an_error() {
        let mut launcher = Launcher::new(LoadingContext::new(Catalog::new()));
        assert!(matches!(launcher.launch(Vec::new(), &[]), Err(LaunchError::NoTweakers)));
    }

    #[test]
    fn test_unknown_tweaker_is_fatal() {
        let mut launcher = Launcher::new(LoadingContext::new(Catalog::new()));
        let result = launcher.launch(vec!["t.Missing".to_string()], &[]);
        assert!(matches!(result, Err(LaunchError::NotFound(name)) if name == "t.Missing"));
    }

    #[test]
    fn test_empty_launch_target_is_skipped() {
        let catalog = Catalog::new().with_tweaker("t.Quiet", || Quiet);
        let mut launcher = Launcher::new(LoadingContext::new(catalog));

        let report = launcher.launch(vec!["t.Quiet".to_string()], &[]).unwrap();
        assert_eq!(report.launch_target, None);
        assert_eq!(report.primary, "t.Quiet");
    }

    #[test]
    fn test_tweaker_namespace_is_excluded() {
        let catalog = Catalog::new().with_tweaker("t.Quiet", || Quiet);
        let mut launcher = Launcher::new(LoadingContext::new(catalog));

        launcher.launch(vec!["t.Quiet".to_string()], &[]).unwrap();
        assert!(launcher.loader().routes().exclusions().contains(&"t".to_string()));
    }

    #[test]
    fn test_inject_failure_stops_the_chain() {
        struct Broken;

        impl Tweaker for Broken {
            fn accept_options(&mut self, _args: &[String]) {}

            fn inject(&mut self, _: &mut LoadingContext, blackboard: &mut Blackboard) -> Result<(), LaunchError> {
                blackboard.push_tweaker("t.Quiet");
                Err(LaunchError::Tweaker {
                    name: "t.Broken".to_string(),
                    reason: "no mixins".to_string(),
                })
            }

            fn launch_target(&self) -> Option<String> {
                None
            }

            fn launch_arguments(&self) -> Vec<String> {
                Vec::new()
            }
        }

        let catalog = Catalog::new()
            .with_tweaker("t.Broken", || Broken)
            .with_tweaker("t.Quiet", || Quiet);
        let mut launcher = Launcher::new(LoadingContext::new(catalog));

        let result = launcher.launch(vec!["t.Broken".to_string()], &[]);
        assert!(matches!(result, Err(LaunchError::Tweaker { .. })));
    }

    #[test]
    fn test_target_failure_propagates() {
        struct Named;

        impl Tweaker for Named {
            fn accept_options(&mut self, _args: &[String]) {}

            fn inject(&mut self, _: &mut LoadingContext, _: &mut Blackboard) -> Result<(), LaunchError> {
                Ok(())
            }

            fn launch_target(&self) -> Option<String> {
                Some("t.Main".to_string())
            }

            fn launch_arguments(&self) -> Vec<String> {
                Vec::new()
            }
        }

        let catalog = Catalog::new()
            .with_tweaker("t.Named", || Named)
            .with_target("t.Main", || Failing);
        let mut launcher = Launcher::new(LoadingContext::new(catalog));

        let result = launcher.launch(vec!["t.Named".to_string()], &[]);
        assert!(matches!(result, Err(LaunchError::Target { .. })));
    }
}
