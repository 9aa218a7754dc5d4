//! Generation assignment over the parent/child graph.
//!
//! People without a generational parent start at generation 0 and depth grows
//! by one per generational hop. When several parents disagree the deepest one
//! wins, so nobody is drawn above an ancestor. Cycles are broken rather than
//! reported.

use crate::graph::{FamilyGraph, NodeIndex};
use crate::style::generation_color;
use kinship_core::{Connection, Person, PersonId, RelationshipType, is_generational};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationInfo {
    pub generation: i32,
    pub color: String,
}

impl GenerationInfo {
    pub fn new(generation: i32) -> Self {
        Self {
            generation,
            color: generation_color(generation),
        }
    }
}

pub type GenerationMap = BTreeMap<PersonId, GenerationInfo>;

pub fn get_generational_connections(connections: &[Connection]) -> Vec<&Connection> {
    connections
        .iter()
        .filter(|c| is_generational(c.relationship_type))
        .collect()
}

pub fn get_sibling_connections(connections: &[Connection]) -> Vec<&Connection> {
    connections
        .iter()
        .filter(|c| c.relationship_type == RelationshipType::Sibling)
        .collect()
}

/// Generation level per node index, in node order.
pub(crate) fn generation_levels(graph: &FamilyGraph<'_>) -> Vec<i32> {
    let n = graph.node_count();
    let mut children: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];
    let mut pending_parents = vec![0usize; n];
    for (parent, child) in graph.generational_pairs() {
        children[parent.0].push(child);
        pending_parents[child.0] += 1;
    }

    let mut generation = vec![0i32; n];
    let mut placed = vec![false; n];
    let mut placed_count = 0;
    let mut queue: VecDeque<NodeIndex> = graph
        .node_indices()
        .filter(|idx| pending_parents[idx.0] == 0)
        .collect();
    let mut cursor = 0;

    loop {
        while let Some(idx) = queue.pop_front() {
            placed[idx.0] = true;
            placed_count += 1;

            for &child in &children[idx.0] {
                // Back edge into a node that already broke a cycle.
                if placed[child.0] {
                    continue;
                }
                generation[child.0] = generation[child.0].max(generation[idx.0] + 1);
                pending_parents[child.0] -= 1;
                if pending_parents[child.0] == 0 {
                    queue.push_back(child);
                }
            }
        }

        if placed_count >= n {
            break;
        }

        // Only nodes on or below a cycle remain. Release the first one in
        // input order at the depth its placed parents already gave it.
        while placed[cursor] {
            cursor += 1;
        }
        tracing::warn!(
            "Generational cycle detected at {}, placing at generation {}",
            graph[NodeIndex(cursor)].id,
            generation[cursor]
        );
        pending_parents[cursor] = 0;
        queue.push_back(NodeIndex(cursor));
    }

    generation
}

/// Assigns every person a generation and its palette color.
pub fn calculate_generations(persons: &[Person], connections: &[Connection]) -> GenerationMap {
    let graph = FamilyGraph::new(persons, connections);
    let levels = generation_levels(&graph);

    graph
        .node_indices()
        .map(|idx| (graph[idx].id.clone(), GenerationInfo::new(levels[idx.0])))
        .collect()
}

/// People grouped by generation, shallowest first, input order within a generation.
pub fn generation_layers<'a>(
    persons: &'a [Person],
    generations: &GenerationMap,
) -> Vec<(i32, Vec<&'a Person>)> {
    let mut layers: BTreeMap<i32, Vec<&'a Person>> = BTreeMap::new();
    for person in persons {
        let generation = generations
            .get(&person.id)
            .map(|info| info.generation)
            .unwrap_or(0);
        let layer = layers.entry(generation).or_default();
        if !layer.iter().any(|p| p.id == person.id) {
            layer.push(person);
        }
    }
    layers.into_iter().collect()
}
