//! Code-loading context for the bootstrap chain
//!
//! Units are created from a [`Catalog`] of registered constructors. Every
//! name is routed through a [`RouteTable`]: names under an excluded namespace
//! are resolved raw (the parent route), everything else passes through each
//! registered [`Transformer`] in registration order.

use std::collections::HashMap;
use std::fmt;

use super::{LaunchTarget, Tweaker};
use crate::application::errors::LaunchError;

/// Namespace the launch machinery itself lives in. Never transformed.
pub const LAUNCH_NAMESPACE: &str = "kookbc.launch";

/// An instantiated unit
pub enum Unit {
    Tweaker(Box<dyn Tweaker>),
    Target(Box<dyn LaunchTarget>),
}

impl Unit {
    pub fn kind(&self) -> &'static str {
        match self {
            Unit::Tweaker(_) => "tweaker",
            Unit::Target(_) => "launch target",
        }
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unit::{}", self.kind())
    }
}

type Factory = Box<dyn Fn() -> Unit>;

/// Registered constructors, keyed by fully-qualified name
#[derive(Default)]
pub struct Catalog {
    factories: HashMap<String, Factory>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_tweaker<T, F>(&mut self, name: impl Into<String>, factory: F)
    where
        T: Tweaker + 'static,
        F: Fn() -> T + 'static,
    {
        self.factories
            .insert(name.into(), Box::new(move || Unit::Tweaker(Box::new(factory()))));
    }

    pub fn register_target<T, F>(&mut self, name: impl Into<String>, factory: F)
    where
        T: LaunchTarget + 'static,
        F: Fn() -> T + 'static,
    {
        self.factories
            .insert(name.into(), Box::new(move || Unit::Target(Box::new(factory()))));
    }

    pub fn with_tweaker<T, F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        T: Tweaker + 'static,
        F: Fn() -> T + 'static,
    {
        self.register_tweaker(name, factory);
        self
    }

    pub fn with_target<T, F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        T: LaunchTarget + 'static,
        F: Fn() -> T + 'static,
    {
        self.register_target(name, factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    fn instantiate(&self, name: &str) -> Result<Unit, LaunchError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| LaunchError::NotFound(name.to_string()))
    }
}

/// Which resolver a name goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Resolved raw, never transformed
    Parent,
    /// Resolved and passed through every transformer
    Transforming,
}

/// Namespace prefixes routed to the parent resolver
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    exclusions: Vec<String>,
}

impl RouteTable {
    pub fn add_exclusion(&mut self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        if !self.exclusions.contains(&namespace) {
            self.exclusions.push(namespace);
        }
    }

    /// A name matches an exclusion when it equals it or lives below it
    pub fn route(&self, name: &str) -> Route {
        let excluded = self.exclusions.iter().any(|ns| {
            name == ns
                || name
                    .strip_prefix(ns.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        });

        if excluded {
            Route::Parent
        } else {
            Route::Transforming
        }
    }

    pub fn exclusions(&self) -> &[String] {
        &self.exclusions
    }
}

/// Rewrites units resolved through the transforming route
pub trait Transformer {
    fn name(&self) -> &str;

    fn transform(&self, unit_name: &str, unit: Unit) -> Result<Unit, LaunchError>;
}

/// Everything up to the last `.`, or the whole name when there is none
pub fn namespace_of(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(namespace, _)| namespace)
}

pub struct LoadingContext {
    catalog: Catalog,
    routes: RouteTable,
    transformers: Vec<Box<dyn Transformer>>,
}

impl LoadingContext {
    pub fn new(catalog: Catalog) -> Self {
        let mut routes = RouteTable::default();
        routes.add_exclusion(LAUNCH_NAMESPACE);

        Self {
            catalog,
            routes,
            transformers: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn add_exclusion(&mut self, namespace: impl Into<String>) {
        self.routes.add_exclusion(namespace);
    }

    pub fn register_transformer(&mut self, transformer: impl Transformer + 'static) {
        tracing::debug!("Registering transformer {}", transformer.name());
        self.transformers.push(Box::new(transformer));
    }

    pub fn route(&self, name: &str) -> Route {
        self.routes.route(name)
    }

    /// Resolve a unit without applying any transformer
    pub fn resolve_raw(&self, name: &str) -> Result<Unit, LaunchError> {
        self.catalog.instantiate(name)
    }

    /// Resolve a unit and run it through every transformer
    pub fn resolve_transformed(&self, name: &str) -> Result<Unit, LaunchError> {
        let mut unit = self.resolve_raw(name)?;
        for transformer in &self.transformers {
            unit = transformer.transform(name, unit)?;
        }
        Ok(unit)
    }

    pub fn resolve(&self, name: &str) -> Result<Unit, LaunchError> {
        match self.route(name) {
            Route::Parent => self.resolve_raw(name),
            Route::Transforming => self.resolve_transformed(name),
        }
    }

    pub fn resolve_tweaker(&self, name: &str) -> Result<Box<dyn Tweaker>, LaunchError> {
        match self.resolve(name)? {
            Unit::Tweaker(tweaker) => Ok(tweaker),
            Unit::Target(_) => Err(LaunchError::WrongKind {
                name: name.to_string(),
                expected: "tweaker",
            }),
        }
    }

    pub fn resolve_target(&self, name: &str) -> Result<Box<dyn LaunchTarget>, LaunchError> {
        match self.resolve(name)? {
            Unit::Target(target) => Ok(target),
            Unit::Tweaker(_) => Err(LaunchError::WrongKind {
                name: name.to_string(),
                expected: "launch target",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Echo {
        seen: Rc<RefCell<Vec<String>>>,
        prefix: &'static str,
    }

    impl LaunchTarget for Echo {
        fn launch(&self, args: &[String]) -> Result<(), LaunchError> {
            let mut seen = self.seen.borrow_mut();
            seen.push(self.prefix.to_string());
            seen.extend(args.iter().cloned());
            Ok(())
        }
    }

    struct Tag;

    impl Transformer for Tag {
        fn name(&self) -> &str {
            "tag"
        }

        fn transform(&self, _unit_name: &str, unit: Unit) -> Result<Unit, LaunchError> {
            match unit {
                Unit::Target(inner) => Ok(Unit::Target(Box::new(Tagged(inner)))),
                other => Ok(other),
            }
        }
    }

    struct Tagged(Box<dyn LaunchTarget>);

    impl LaunchTarget for Tagged {
        fn launch(&self, args: &[String]) -> Result<(), LaunchError> {
            let mut tagged = vec!["tagged".to_string()];
            tagged.extend(args.iter().cloned());
            self.0.launch(&tagged)
        }
    }

    fn context(seen: &Rc<RefCell<Vec<String>>>) -> LoadingContext {
        let a = seen.clone();
        let b = seen.clone();
        let catalog = Catalog::new()
            .with_target("app.Main", move || Echo { seen: a.clone(), prefix: "app" })
            .with_target("lib.Main", move || Echo { seen: b.clone(), prefix: "lib" });
        LoadingContext::new(catalog)
    }

    #[test]
    fn test_namespace_of() {
        assert_eq!(namespace_of("kookbc.launch.HostTweaker"), "kookbc.launch");
        assert_eq!(namespace_of("Plain"), "Plain");
    }

    #[test]
    fn test_route_respects_namespace_boundary() {
        let mut routes = RouteTable::default();
        routes.add_exclusion("app.core");

        assert_eq!(routes.route("app.core"), Route::Parent);
        assert_eq!(routes.route("app.core.Main"), Route::Parent);
        assert_eq!(routes.route("app.coreutils.Main"), Route::Transforming);
        assert_eq!(routes.route("other.Main"), Route::Transforming);
    }

    #[test]
    fn test_transformer_applies_only_on_transforming_route() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut loader = context(&seen);
        loader.register_transformer(Tag);
        loader.add_exclusion("lib");

        loader.resolve_target("app.Main").unwrap().launch(&["x".to_string()]).unwrap();
        loader.resolve_target("lib.Main").unwrap().launch(&["y".to_string()]).unwrap();

        assert_eq!(*seen.borrow(), vec!["app", "tagged", "x", "lib", "y"]);
    }

    #[test]
    fn test_unknown_name_and_wrong_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let loader = context(&seen);

        assert!(matches!(loader.resolve("nope.Main"), Err(LaunchError::NotFound(_))));
        assert!(matches!(
            loader.resolve_tweaker("app.Main"),
            Err(LaunchError::WrongKind { expected: "tweaker", .. })
        ));
    }

    #[test]
    fn test_launch_namespace_is_excluded_by_default() {
        let loader = LoadingContext::new(Catalog::new());
        assert_eq!(loader.route("kookbc.launch.HostTweaker"), Route::Parent);
    }
}
