//! Shared bootstrap context
//!
//! One blackboard exists per launch. It is handed by `&mut` to every
//! tweaker's inject hook and dropped when the launch returns.

use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Default)]
pub struct Blackboard {
    pending: VecDeque<String>,
    visited: HashSet<String>,
    tweakers: Vec<String>,
    arguments: Vec<String>,
    properties: HashMap<String, String>,
}

impl Blackboard {
    pub fn new(initial: impl IntoIterator<Item = String>) -> Self {
        Self {
            pending: initial.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Queue another tweaker. Names already visited are dropped later with a warning.
    pub fn push_tweaker(&mut self, name: impl Into<String>) {
        self.pending.push_back(name.into());
    }

    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn has_visited(&self, name: &str) -> bool {
        self.visited.contains(name)
    }

    /// Names instantiated so far, in instantiation order
    pub fn tweakers(&self) -> &[String] {
        &self.tweakers
    }

    /// Final argument list. Empty until every tweaker has been processed.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Get a value shared between tweakers
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Set a value shared between tweakers
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub(crate) fn next_pending(&mut self) -> Option<String> {
        self.pending.pop_front()
    }

    /// Returns false when the name was already visited
    pub(crate) fn visit(&mut self, name: &str) -> bool {
        self.visited.insert(name.to_string())
    }

    pub(crate) fn record_tweaker(&mut self, name: &str) {
        self.tweakers.push(name.to_string());
    }

    pub(crate) fn set_arguments(&mut self, arguments: Vec<String>) {
        self.arguments = arguments;
    }

    pub(crate) fn visited(&self) -> &HashSet<String> {
        &self.visited
    }
}
