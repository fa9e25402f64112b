use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::graph::{GraphError, Result};

pub(crate) type Edges = BTreeMap<String, Vec<String>>;

/// Package name to ordered dependency list, kept acyclic on every mutation.
///
/// Keys iterate in lexicographic order; each dependency list keeps the order
/// it was given in. Committed state lives behind an `Arc` so snapshots are
/// cheap and never observe a rejected mutation.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: Arc<Edges>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or fully replaces the dependency list of `name`.
    ///
    /// The new mapping is built and checked on the side and only swapped in
    /// when it is still acyclic, so a `CycleDetected` error leaves the graph
    /// exactly as it was.
    pub fn set_dependencies<N, I, D>(&mut self, name: N, dependencies: I) -> Result<()>
    where
        N: Into<String>,
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GraphError::InvalidArgument(
                "node name cannot be empty".to_string(),
            ));
        }

        let dependencies: Vec<String> = dependencies.into_iter().map(Into::into).collect();
        if dependencies.iter().any(|dep| dep.trim().is_empty()) {
            return Err(GraphError::InvalidArgument(format!(
                "dependencies of node '{}' cannot contain an empty name",
                name
            )));
        }

        let mut tentative = Edges::clone(&self.edges);
        let count = dependencies.len();
        tentative.insert(name.clone(), dependencies);

        if let Some(path) = find_cycle(&tentative) {
            debug!(node = %name, cycle = %path.join(" -> "), "rejected dependency update");
            return Err(GraphError::CycleDetected { node: name, path });
        }

        debug!(node = %name, dependencies = count, "set dependencies");
        self.edges = Arc::new(tentative);
        Ok(())
    }

    /// Read-only view of the last committed mapping.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            edges: Arc::clone(&self.edges),
        }
    }

    pub fn dependencies_of(&self, name: &str) -> Option<&[String]> {
        self.edges.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub(crate) fn edges(&self) -> &Edges {
        &self.edges
    }

    /// Builds a graph without the acyclicity check, for exercising the
    /// resolver's guards against malformed input.
    #[cfg(test)]
    pub(crate) fn from_edges_unchecked(edges: Edges) -> Self {
        Self {
            edges: Arc::new(edges),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSnapshot {
    edges: Arc<Edges>,
}

impl GraphSnapshot {
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.edges.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.edges
            .iter()
            .map(|(name, deps)| (name.as_str(), deps.as_slice()))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn to_map(&self) -> BTreeMap<String, Vec<String>> {
        Edges::clone(&self.edges)
    }
}

impl Serialize for GraphSnapshot {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.edges.as_ref().serialize(serializer)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Visiting,
    Visited,
}

/// Returns the first cycle found, as a path that starts and ends on the
/// repeated node. Names that are not keys are treated as explored leaves.
pub(crate) fn find_cycle(edges: &Edges) -> Option<Vec<String>> {
    let mut state: HashMap<&str, VisitState> = HashMap::new();

    for root in edges.keys() {
        if state.contains_key(root.as_str()) {
            continue;
        }
        state.insert(root.as_str(), VisitState::Visiting);
        let mut stack: Vec<(&str, usize)> = vec![(root.as_str(), 0)];

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let deps = edges.get(node).map(Vec::as_slice).unwrap_or(&[]);
            let Some(dep) = deps.get(frame.1) else {
                state.insert(node, VisitState::Visited);
                stack.pop();
                continue;
            };
            frame.1 += 1;
            let dep = dep.as_str();

            match state.get(dep) {
                Some(VisitState::Visited) => {}
                Some(VisitState::Visiting) => {
                    let start = stack.iter().position(|(id, _)| *id == dep).unwrap_or(0);
                    let mut path: Vec<String> =
                        stack[start..].iter().map(|(id, _)| id.to_string()).collect();
                    path.push(dep.to_string());
                    return Some(path);
                }
                None => {
                    if edges.contains_key(dep) {
                        state.insert(dep, VisitState::Visiting);
                        stack.push((dep, 0));
                    } else {
                        state.insert(dep, VisitState::Visited);
                    }
                }
            }
        }
    }

    None
}
