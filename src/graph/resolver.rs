use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::graph::store::{DependencyGraph, Edges};

/// Read-only reports over a [`DependencyGraph`].
///
/// Roots are visited in the graph's key order and dependencies in the order
/// they were declared. All walks use explicit stacks, so depth is bounded by
/// memory rather than the call stack.
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'g> {
    graph: &'g DependencyGraph,
}

impl<'g> DependencyResolver<'g> {
    pub fn new(graph: &'g DependencyGraph) -> Self {
        Self { graph }
    }

    /// Pre-order walk from every root that repeats shared dependencies once
    /// per path leading to them.
    ///
    /// There is no visited set here: the graph is acyclic by construction.
    pub fn resolve_full_traversal(&self) -> Vec<String> {
        let edges = self.graph.edges();
        let mut out = Vec::new();
        for root in edges.keys() {
            expand_into(edges, root, &mut out);
        }
        trace!(entries = out.len(), "resolved full traversal");
        out
    }

    /// Full traversal rooted at a single node. `None` if the graph has never
    /// heard of `name`.
    pub fn resolve_node(&self, name: &str) -> Option<Vec<String>> {
        if !self.is_known(name) {
            return None;
        }
        let mut out = Vec::new();
        expand_into(self.graph.edges(), name, &mut out);
        Some(out)
    }

    /// Length of [`Self::resolve_full_traversal`] without building it.
    pub fn traversal_count(&self) -> usize {
        let edges = self.graph.edges();
        let mut memo: HashMap<&str, usize> = HashMap::new();
        edges.keys().fold(0usize, |total, root| {
            total.saturating_add(subtree_count(edges, root, &mut memo))
        })
    }

    /// Indented tree of every root, one `"- name"` line per node with two
    /// spaces per level.
    pub fn pretty_print(&self) -> String {
        let edges = self.graph.edges();
        let mut out = String::new();
        for root in edges.keys() {
            render_into(edges, root, &mut out);
        }
        out
    }

    pub fn pretty_print_node(&self, name: &str) -> Option<String> {
        if !self.is_known(name) {
            return None;
        }
        let mut out = String::new();
        render_into(self.graph.edges(), name, &mut out);
        Some(out)
    }

    fn is_known(&self, name: &str) -> bool {
        let edges = self.graph.edges();
        edges.contains_key(name)
            || edges
                .values()
                .any(|deps| deps.iter().any(|dep| dep == name))
    }
}

fn dependencies<'a>(edges: &'a Edges, node: &str) -> &'a [String] {
    edges.get(node).map(Vec::as_slice).unwrap_or(&[])
}

fn expand_into(edges: &Edges, root: &str, out: &mut Vec<String>) {
    let mut stack: Vec<&str> = vec![root];
    while let Some(node) = stack.pop() {
        out.push(node.to_string());
        stack.extend(dependencies(edges, node).iter().rev().map(String::as_str));
    }
}

fn subtree_count<'a>(
    edges: &'a Edges,
    root: &'a str,
    memo: &mut HashMap<&'a str, usize>,
) -> usize {
    let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
    while let Some(frame) = stack.last_mut() {
        let node = frame.0;
        if memo.contains_key(node) {
            stack.pop();
            continue;
        }
        let deps = dependencies(edges, node);
        if let Some(dep) = deps.get(frame.1) {
            frame.1 += 1;
            if !memo.contains_key(dep.as_str()) {
                stack.push((dep.as_str(), 0));
            }
            continue;
        }
        let total = deps.iter().fold(1usize, |acc, dep| {
            acc.saturating_add(memo.get(dep.as_str()).copied().unwrap_or(1))
        });
        memo.insert(node, total);
        stack.pop();
    }
    memo.get(root).copied().unwrap_or(1)
}

fn push_line(out: &mut String, depth: usize, name: &str) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str("- ");
    out.push_str(name);
    out.push('\n');
}

// A node is skipped only while it is its own ancestor. Sibling reuse still
// prints, so this never fires on an acyclic graph.
fn render_into(edges: &Edges, root: &str, out: &mut String) {
    let mut path: HashSet<&str> = HashSet::new();
    let mut stack: Vec<(&str, usize)> = Vec::new();

    push_line(out, 0, root);
    path.insert(root);
    stack.push((root, 0));

    loop {
        let depth = stack.len();
        let Some(frame) = stack.last_mut() else {
            break;
        };
        let node = frame.0;
        let Some(dep) = dependencies(edges, node).get(frame.1) else {
            path.remove(node);
            stack.pop();
            continue;
        };
        frame.1 += 1;
        let dep = dep.as_str();
        if path.contains(dep) {
            continue;
        }
        push_line(out, depth, dep);
        path.insert(dep);
        stack.push((dep, 0));
    }
}
