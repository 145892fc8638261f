//! Dependency ordering for plugins
//!
//! `a` sorts before `b` whenever `b` lists `a` as a hard or soft dependency.
//! Among the units whose dependencies are all placed, the one discovered
//! first goes next, so unrelated units keep their discovery order.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::domain::entities::PluginDescription;

/// Result of sorting a set of descriptions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadOrder {
    /// Indices into the input, in load order
    pub order: Vec<usize>,
    /// Names of the units on every cycle that had to be broken, in discovery order
    pub cycles: Vec<Vec<String>>,
}

/// Edge from a unit to one of its dependencies
#[derive(Debug, Clone, Copy)]
struct Dependency {
    index: usize,
    hard: bool,
}

/// Sort descriptions with Kahn's algorithm.
///
/// Dependencies on names outside `descriptions` add no edge. When every
/// remaining unit waits on another, one unit of a cycle that nothing outside
/// it feeds is placed to break it. Units whose pending dependencies are all
/// soft are preferred, then the earliest discovered. Each broken cycle is
/// reported once in `cycles`.
pub fn resolve_load_order(descriptions: &[&PluginDescription]) -> LoadOrder {
    let n = descriptions.len();

    let mut name_to_index: HashMap<&str, usize> = HashMap::with_capacity(n);
    for (i, desc) in descriptions.iter().enumerate() {
        name_to_index.entry(desc.name.as_str()).or_insert(i);
    }

    let mut dependencies: Vec<Vec<Dependency>> = vec![Vec::new(); n];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

    for (i, desc) in descriptions.iter().enumerate() {
        let hard = desc.depend.iter().map(|d| (d, true));
        let soft = desc.soft_depend.iter().map(|d| (d, false));
        for (dep, is_hard) in hard.chain(soft) {
            let Some(&dep_idx) = name_to_index.get(dep.as_str()) else {
                continue;
            };
            // Hard entries come first, so a name listed twice stays hard
            if dep_idx == i || dependencies[i].iter().any(|d| d.index == dep_idx) {
                continue;
            }
            dependencies[i].push(Dependency {
                index: dep_idx,
                hard: is_hard,
            });
            dependents[dep_idx].push(i);
        }
    }

    let mut in_degree: Vec<usize> = dependencies.iter().map(Vec::len).collect();
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, deg)| **deg == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut placed = vec![false; n];
    let mut reported = vec![false; n];
    let mut result = LoadOrder::default();

    while result.order.len() < n {
        let idx = match ready.pop() {
            Some(Reverse(idx)) => idx,
            None => {
                let members = stalled_cycle(&dependencies, &placed);
                if members.iter().any(|&m| !reported[m]) {
                    for &m in &members {
                        reported[m] = true;
                    }
                    result
                        .cycles
                        .push(members.iter().map(|&m| descriptions[m].name.clone()).collect());
                }

                let breaker = members
                    .iter()
                    .copied()
                    .find(|&m| {
                        dependencies[m]
                            .iter()
                            .filter(|d| !placed[d.index])
                            .all(|d| !d.hard)
                    })
                    .or_else(|| members.first().copied())
                    .or_else(|| (0..n).find(|&i| !placed[i]));
                match breaker {
                    Some(breaker) => {
                        in_degree[breaker] = 0;
                        breaker
                    }
                    None => break,
                }
            }
        };

        if placed[idx] {
            continue;
        }
        placed[idx] = true;
        result.order.push(idx);

        for &dependent in &dependents[idx] {
            if placed[dependent] {
                continue;
            }
            in_degree[dependent] = in_degree[dependent].saturating_sub(1);
            if in_degree[dependent] == 0 {
                ready.push(Reverse(dependent));
            }
        }
    }

    result
}

/// Find a cycle among unplaced units that depends on nothing unplaced
/// outside itself. Members come back in discovery order.
///
/// Only called once every unplaced unit has a pending dependency, so such a
/// cycle always exists.
fn stalled_cycle(dependencies: &[Vec<Dependency>], placed: &[bool]) -> Vec<usize> {
    let n = dependencies.len();
    let reach: Vec<Vec<bool>> = (0..n)
        .map(|i| {
            if placed[i] {
                Vec::new()
            } else {
                reachable(dependencies, placed, i)
            }
        })
        .collect();

    for i in (0..n).filter(|&i| !placed[i]) {
        if !reach[i][i] {
            continue;
        }
        // Everything `i` waits on must also wait on `i`
        let closed = (0..n).filter(|&j| reach[i][j]).all(|j| reach[j][i]);
        if closed {
            return (0..n).filter(|&j| reach[i][j]).collect();
        }
    }

    Vec::new()
}

/// Units reachable from `start` through one or more unplaced dependency edges
fn reachable(dependencies: &[Vec<Dependency>], placed: &[bool], start: usize) -> Vec<bool> {
    let mut seen = vec![false; dependencies.len()];
    let mut stack = vec![start];

    while let Some(current) = stack.pop() {
        for dep in dependencies[current].iter().filter(|d| !placed[d.index]) {
            if !seen[dep.index] {
                seen[dep.index] = true;
                stack.push(dep.index);
            }
        }
    }

    seen
}
