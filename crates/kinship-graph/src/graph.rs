use kinship_core::{Connection, Person, PersonId, RelationshipType, is_generational};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Index;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An edge whose endpoints both resolved to people in the loaded set.
#[derive(Debug, Clone, Copy)]
pub struct GraphEdge<'a> {
    pub connection: &'a Connection,
    pub source: NodeIndex,
    pub target: NodeIndex,
}

/// Indexed view over one layout pass worth of people and connections.
///
/// Connections that point at people outside the set, or at the same person
/// on both ends, are dropped on construction. Nodes keep input order.
#[derive(Debug)]
pub struct FamilyGraph<'a> {
    persons: Vec<&'a Person>,
    node_map: HashMap<&'a PersonId, NodeIndex>,
    edges: Vec<GraphEdge<'a>>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl<'a> FamilyGraph<'a> {
    pub fn new(persons: &'a [Person], connections: &'a [Connection]) -> Self {
        let mut node_map = HashMap::with_capacity(persons.len());
        let mut nodes = Vec::with_capacity(persons.len());
        for person in persons {
            if node_map.contains_key(&person.id) {
                tracing::warn!("Ignoring duplicate person id {}", person.id);
                continue;
            }
            node_map.insert(&person.id, NodeIndex(nodes.len()));
            nodes.push(person);
        }

        let mut graph = Self {
            outgoing: vec![Vec::new(); nodes.len()],
            incoming: vec![Vec::new(); nodes.len()],
            persons: nodes,
            node_map,
            edges: Vec::with_capacity(connections.len()),
        };

        for connection in connections {
            graph.add_edge(connection);
        }

        graph
    }

    fn add_edge(&mut self, connection: &'a Connection) {
        let source = self.node_map.get(&connection.from_person_id).copied();
        let target = self.node_map.get(&connection.to_person_id).copied();

        match (source, target) {
            (Some(source), Some(target)) if source == target => {
                tracing::warn!(
                    "Dropping self-referential connection {} on person {}",
                    connection.id,
                    connection.from_person_id
                );
            }
            (Some(source), Some(target)) => {
                let edge_idx = self.edges.len();
                self.edges.push(GraphEdge {
                    connection,
                    source,
                    target,
                });
                self.outgoing[source.0].push(edge_idx);
                self.incoming[target.0].push(edge_idx);
            }
            _ => {
                tracing::debug!(
                    "Dropping connection {} because an endpoint is not in the loaded set",
                    connection.id
                );
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.persons.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        (0..self.persons.len()).map(NodeIndex)
    }

    pub fn index_of(&self, id: &PersonId) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    pub fn person(&self, index: NodeIndex) -> Option<&'a Person> {
        self.persons.get(index.0).copied()
    }

    pub fn persons(&self) -> &[&'a Person] {
        &self.persons
    }

    pub fn edges(&self) -> &[GraphEdge<'a>] {
        &self.edges
    }

    pub fn outgoing(&self, index: NodeIndex) -> impl Iterator<Item = &GraphEdge<'a>> + '_ {
        self.outgoing[index.0].iter().map(|&e| &self.edges[e])
    }

    pub fn incoming(&self, index: NodeIndex) -> impl Iterator<Item = &GraphEdge<'a>> + '_ {
        self.incoming[index.0].iter().map(|&e| &self.edges[e])
    }

    /// Parent-to-child pairs, one per distinct pair.
    ///
    /// `child` edges are read backwards so every pair points down a generation.
    pub fn generational_pairs(&self) -> Vec<(NodeIndex, NodeIndex)> {
        let mut seen = HashSet::new();
        let mut pairs = Vec::new();
        for edge in &self.edges {
            let kind = edge.connection.relationship_type;
            if !is_generational(kind) {
                continue;
            }
            let pair = match kind {
                RelationshipType::Child => (edge.target, edge.source),
                _ => (edge.source, edge.target),
            };
            if seen.insert(pair) {
                pairs.push(pair);
            }
        }
        pairs
    }
}

impl<'a> Index<NodeIndex> for FamilyGraph<'a> {
    type Output = Person;
    fn index(&self, index: NodeIndex) -> &Self::Output {
        self.persons[index.0]
    }
}

/// Lookup table from id to person, first occurrence wins.
pub fn person_lookup(persons: &[Person]) -> HashMap<&PersonId, &Person> {
    let mut lookup = HashMap::with_capacity(persons.len());
    for person in persons {
        lookup.entry(&person.id).or_insert(person);
    }
    lookup
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people(ids: &[&str]) -> Vec<Person> {
        ids.iter().map(|id| Person::new(*id, id.to_uppercase())).collect()
    }

    #[test]
    fn test_family_graph_drops_stale_and_self_edges() {
        let persons = people(&["a", "b"]);
        let connections = vec![
            Connection::new("c1", "a", "b", RelationshipType::Parent),
            Connection::new("c2", "a", "ghost", RelationshipType::Parent),
            Connection::new("c3", "b", "b", RelationshipType::Sibling),
        ];

        let graph = FamilyGraph::new(&persons, &connections);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges()[0].connection.id.as_str(), "c1");
    }

    #[test]
    fn test_duplicate_person_ids_keep_first() {
        let persons = vec![Person::new("a", "First"), Person::new("a", "Second")];
        let graph = FamilyGraph::new(&persons, &[]);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph[NodeIndex(0)].name, "First");
    }

    #[test]
    fn test_generational_pairs_flip_child_edges() {
        let persons = people(&["p", "c"]);
        let connections = vec![
            Connection::new("c1", "c", "p", RelationshipType::Child),
            Connection::new("c2", "p", "c", RelationshipType::Parent),
            Connection::new("c3", "p", "c", RelationshipType::Partner),
        ];
        let graph = FamilyGraph::new(&persons, &connections);

        let pairs = graph.generational_pairs();
        assert_eq!(pairs, vec![(NodeIndex(0), NodeIndex(1))]);
    }
}
