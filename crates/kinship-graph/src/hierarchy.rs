//! Rooted tree over an arbitrary person graph, for layouts that need one.

use crate::graph::{FamilyGraph, NodeIndex};
use kinship_core::{Connection, Person, PersonId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub person: Person,
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    pub fn leaf(person: Person) -> Self {
        Self {
            person,
            children: Vec::new(),
        }
    }

    /// Person ids in pre-order.
    pub fn flatten(&self) -> Vec<&PersonId> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(&node.person.id);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Number of levels below and including this node.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(|c| c.leaf_count()).sum()
        }
    }
}

/// First person with no incoming connection, else the first person.
fn select_root(graph: &FamilyGraph<'_>) -> Option<NodeIndex> {
    graph
        .node_indices()
        .find(|&idx| graph.incoming(idx).next().is_none())
        .or_else(|| {
            let first = graph.node_indices().next();
            if first.is_some() {
                tracing::debug!("No undominated person, falling back to first in input order");
            }
            first
        })
}

fn build_subtree(
    graph: &FamilyGraph<'_>,
    idx: NodeIndex,
    visited: &mut HashSet<NodeIndex>,
) -> HierarchyNode {
    visited.insert(idx);
    let mut node = HierarchyNode::leaf(graph[idx].clone());

    for edge in graph.outgoing(idx) {
        // Already placed elsewhere in the tree, or reached again through a cycle.
        if visited.contains(&edge.target) {
            continue;
        }
        node.children.push(build_subtree(graph, edge.target, visited));
    }

    node
}

/// Builds a tree in which every person appears exactly once.
///
/// Descendants follow `from -> to` edges from the root. People the root
/// cannot reach are hung directly under it, each with whatever of its own
/// descendants are still unplaced.
pub fn build_hierarchy(persons: &[Person], connections: &[Connection]) -> Option<HierarchyNode> {
    let graph = FamilyGraph::new(persons, connections);
    let root_idx = select_root(&graph)?;

    let mut visited = HashSet::with_capacity(graph.node_count());
    let mut root = build_subtree(&graph, root_idx, &mut visited);

    for idx in graph.node_indices() {
        if visited.contains(&idx) {
            continue;
        }
        tracing::debug!(
            "Attaching disconnected person {} under root {}",
            graph[idx].id,
            root.person.id
        );
        let orphan = build_subtree(&graph, idx, &mut visited);
        root.children.push(orphan);
    }

    Some(root)
}
