//! Transitive closure over "depends on" edges between test groups.
//!
//! A group's closure is the smallest set containing the group itself and
//! every prerequisite of any member. The closure is computed by iterating to
//! a fixed point, so cycles are harmless and the result does not depend on
//! the order groups were declared in.

use crate::domain::model::Group;
use crate::utils::error::{ConvertError, Result};
use std::collections::{BTreeSet, HashMap};

/// Direct prerequisites of every declared group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraph {
    /// Declaration order; drives iteration.
    order: Vec<String>,
    edges: HashMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    pub fn from_groups(groups: &[Group]) -> Result<Self> {
        Self::from_edges(
            groups
                .iter()
                .map(|g| (g.name.as_str(), g.dependencies.iter().map(String::as_str))),
        )
    }

    /// Builds the graph from `(group, direct prerequisites)` pairs.
    ///
    /// Every prerequisite must itself be one of the listed groups.
    pub fn from_edges<I, S, D>(edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, D)>,
        S: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        let mut order: Vec<String> = Vec::new();
        let mut table: HashMap<String, BTreeSet<String>> = HashMap::new();

        for (group, dependencies) in edges {
            let group: String = group.into();
            let dependencies: BTreeSet<String> =
                dependencies.into_iter().map(Into::into).collect();
            if table.contains_key(&group) {
                return Err(ConvertError::DuplicateGroupError { group });
            }
            order.push(group.clone());
            table.insert(group, dependencies);
        }

        for group in &order {
            if let Some(missing) = table[group].iter().find(|d| !table.contains_key(*d)) {
                return Err(ConvertError::UnknownDependencyError {
                    group: group.clone(),
                    dependency: missing.clone(),
                });
            }
        }

        Ok(Self { order, edges: table })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn resolve(&self) -> Closures {
        let mut closures: HashMap<String, BTreeSet<String>> = self
            .order
            .iter()
            .map(|group| {
                let mut closure = self.edges[group].clone();
                closure.insert(group.clone());
                (group.clone(), closure)
            })
            .collect();

        let mut passes = 0;
        loop {
            passes += 1;
            let mut updated = false;
            for group in &self.order {
                let reachable: BTreeSet<String> = closures[group]
                    .iter()
                    .flat_map(|member| closures[member].iter().cloned())
                    .collect();
                let Some(closure) = closures.get_mut(group) else {
                    continue;
                };
                let before = closure.len();
                closure.extend(reachable);
                if closure.len() != before {
                    updated = true;
                }
            }
            if !updated {
                break;
            }
        }
        tracing::debug!("Dependency closure converged after {} passes", passes);

        let resolved = Closures {
            order: self.order.clone(),
            closures,
        };
        for group in resolved.cyclic_groups() {
            tracing::warn!("Group '{}' is part of a dependency cycle", group);
        }
        resolved
    }
}

/// Resolved closures, one per group, each containing the group itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closures {
    order: Vec<String>,
    closures: HashMap<String, BTreeSet<String>>,
}

impl Closures {
    /// Members of `group`'s closure in lexicographic order.
    pub fn members(&self, group: &str) -> Option<Vec<&str>> {
        self.closures
            .get(group)
            .map(|closure| closure.iter().map(String::as_str).collect())
    }

    pub fn get(&self, group: &str) -> Option<&BTreeSet<String>> {
        self.closures.get(group)
    }

    /// `(group, closure)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> + '_ {
        self.order
            .iter()
            .map(move |group| (group.as_str(), &self.closures[group]))
    }

    /// Groups that are, directly or not, a prerequisite of one of their own prerequisites.
    pub fn cyclic_groups(&self) -> Vec<&str> {
        self.iter()
            .filter(|(group, closure)| {
                closure
                    .iter()
                    .filter(|member| member.as_str() != *group)
                    .any(|member| self.closures[member].contains(*group))
            })
            .map(|(group, _)| group)
            .collect()
    }

    /// Treats every closure as a set of direct prerequisites again.
    pub fn into_graph(self) -> DependencyGraph {
        DependencyGraph {
            order: self.order,
            edges: self.closures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, Vec<&str>)]) -> DependencyGraph {
        DependencyGraph::from_edges(edges.iter().map(|(g, deps)| (*g, deps.iter().copied())))
            .unwrap()
    }

    fn members<'a>(closures: &'a Closures, group: &str) -> Vec<&'a str> {
        closures.members(group).unwrap()
    }

    #[test]
    fn test_acyclic_closure_is_reachability() {
        let closures = graph(&[
            ("sample", vec![]),
            ("easy", vec!["sample"]),
            ("medium", vec!["easy"]),
            ("hard", vec!["medium", "extra"]),
            ("extra", vec![]),
        ])
        .resolve();

        assert_eq!(members(&closures, "sample"), vec!["sample"]);
        assert_eq!(members(&closures, "easy"), vec!["easy", "sample"]);
        assert_eq!(members(&closures, "medium"), vec!["easy", "medium", "sample"]);
        assert_eq!(
            members(&closures, "hard"),
            vec!["easy", "extra", "hard", "medium", "sample"]
        );
        assert_eq!(members(&closures, "extra"), vec!["extra"]);
        assert!(closures.cyclic_groups().is_empty());
    }

    #[test]
    fn test_forward_reference_resolved() {
        // "a" depends on a group declared after it.
        let closures = graph(&[("a", vec!["b"]), ("b", vec!["c"]), ("c", vec![])]).resolve();
        assert_eq!(members(&closures, "a"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_closure_is_reflexive() {
        let closures = graph(&[("x", vec![]), ("y", vec!["x"]), ("z", vec!["y", "x"])]).resolve();
        for (group, closure) in closures.iter() {
            assert!(closure.contains(group), "{group} missing from its own closure");
        }
    }

    #[test]
    fn test_closure_is_transitively_complete() {
        let closures = graph(&[
            ("a", vec!["b"]),
            ("b", vec!["c", "d"]),
            ("c", vec!["e"]),
            ("d", vec![]),
            ("e", vec!["d"]),
        ])
        .resolve();

        for (_, closure) in closures.iter() {
            for member in closure {
                assert!(closures.get(member).unwrap().is_subset(closure));
            }
        }
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let once = graph(&[("a", vec!["b"]), ("b", vec!["c"]), ("c", vec!["a"]), ("d", vec!["c"])]).resolve();
        let twice = once.clone().into_graph().resolve();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_result_independent_of_declaration_order() {
        let forward = graph(&[
            ("a", vec!["b"]),
            ("b", vec!["c"]),
            ("c", vec!["b"]),
            ("d", vec!["a"]),
            ("e", vec![]),
        ])
        .resolve();
        let backward = graph(&[
            ("e", vec![]),
            ("d", vec!["a"]),
            ("c", vec!["b"]),
            ("b", vec!["c"]),
            ("a", vec!["b"]),
        ])
        .resolve();
        let shuffled = graph(&[
            ("c", vec!["b"]),
            ("a", vec!["b"]),
            ("e", vec![]),
            ("b", vec!["c"]),
            ("d", vec!["a"]),
        ])
        .resolve();

        for group in ["a", "b", "c", "d", "e"] {
            assert_eq!(forward.get(group), backward.get(group), "group {group}");
            assert_eq!(forward.get(group), shuffled.get(group), "group {group}");
        }
        assert_eq!(members(&forward, "d"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_mutual_dependency() {
        let closures = graph(&[("A", vec!["B"]), ("B", vec!["A"])]).resolve();
        assert_eq!(members(&closures, "A"), vec!["A", "B"]);
        assert_eq!(members(&closures, "B"), vec!["A", "B"]);
        assert_eq!(closures.cyclic_groups(), vec!["A", "B"]);
    }

    #[test]
    fn test_long_cycle_with_tail() {
        let closures = graph(&[
            ("a", vec!["b"]),
            ("b", vec!["c"]),
            ("c", vec!["a"]),
            ("tail", vec!["c"]),
        ])
        .resolve();

        for group in ["a", "b", "c"] {
            assert_eq!(members(&closures, group), vec!["a", "b", "c"]);
        }
        assert_eq!(members(&closures, "tail"), vec!["a", "b", "c", "tail"]);
        assert_eq!(closures.cyclic_groups(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_self_dependency() {
        let closures = graph(&[("a", vec!["a"])]).resolve();
        assert_eq!(members(&closures, "a"), vec!["a"]);
        assert!(closures.cyclic_groups().is_empty());
    }

    #[test]
    fn test_unknown_dependency_is_error() {
        let err = DependencyGraph::from_edges([("easy", vec!["sample"])]).unwrap_err();
        match err {
            ConvertError::UnknownDependencyError { group, dependency } => {
                assert_eq!(group, "easy");
                assert_eq!(dependency, "sample");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_group_is_error() {
        let err =
            DependencyGraph::from_edges([("a", Vec::<&str>::new()), ("a", vec![])]).unwrap_err();
        assert!(matches!(err, ConvertError::DuplicateGroupError { .. }));
    }

    #[test]
    fn test_from_groups() {
        let groups = vec![
            Group::new("sample", 0),
            Group::new("easy", 100).depends_on(["sample"]),
        ];
        let graph = DependencyGraph::from_groups(&groups).unwrap();
        assert_eq!(graph.len(), 2);

        let closures = graph.resolve();
        assert_eq!(members(&closures, "sample"), vec!["sample"]);
        assert_eq!(members(&closures, "easy"), vec!["easy", "sample"]);
    }
}
