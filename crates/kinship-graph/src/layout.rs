use crate::cluster::ClusterLayouter;
use crate::force::ForceLayouter;
use crate::generation::generation_levels;
use crate::graph::{FamilyGraph, NodeIndex, Vec2};
use crate::radial::RadialLayouter;
use crate::style::{LinkStyle, NodeColors, get_link_style, get_node_colors_with};
use kinship_core::{Connection, ConnectionId, Person, PersonId, RelationshipType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Computes 2-D positions for one family.
///
/// Implementations are pure: the same input always yields the same layout,
/// and any change to the input is handled by laying everything out again.
pub trait FamilyLayouter {
    fn name(&self) -> &'static str;

    fn layout(&self, persons: &[Person], connections: &[Connection], canvas: Canvas)
    -> FamilyLayout;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(1200.0, 800.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// Spacing knobs shared by the layout engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Empty border kept inside the canvas.
    pub margin: f32,
    pub node_radius: f32,
    /// Preferred distance between generation rows or depth bands.
    pub layer_spacing: f32,
    /// Preferred distance between neighbours in a row.
    pub node_spacing: f32,
    /// Preferred distance between radial rings.
    pub ring_spacing: f32,
    pub force_iterations: usize,
    /// Rest length of a link in the force layout.
    pub force_link_length: f32,
    /// Hex colors replacing the built-in generation palette. Empty keeps the default.
    pub palette: Vec<String>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            margin: 40.0,
            node_radius: 24.0,
            layer_spacing: 140.0,
            node_spacing: 110.0,
            ring_spacing: 120.0,
            force_iterations: 300,
            force_link_length: 120.0,
            palette: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    pub person_id: PersonId,
    pub name: String,
    pub position: Vec2,
    pub generation: i32,
    pub is_self: bool,
    pub colors: NodeColors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutLink {
    pub connection_id: ConnectionId,
    pub from: PersonId,
    pub to: PersonId,
    pub relationship: RelationshipType,
    /// Polyline from the `from` node to the `to` node.
    pub route: Vec<Vec2>,
    pub style: LinkStyle,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyLayout {
    pub nodes: Vec<PositionedNode>,
    pub links: Vec<LayoutLink>,
    pub bounds: Rect,
}

impl FamilyLayout {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn position_of(&self, id: &PersonId) -> Option<Vec2> {
        self.nodes
            .iter()
            .find(|n| &n.person_id == id)
            .map(|n| n.position)
    }

    pub fn node(&self, id: &PersonId) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| &n.person_id == id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    Radial,
    Cluster,
    #[default]
    Tree,
    Force,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 4] = [
        LayoutKind::Radial,
        LayoutKind::Cluster,
        LayoutKind::Tree,
        LayoutKind::Force,
    ];
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayoutKind::Radial => "radial",
            LayoutKind::Cluster => "cluster",
            LayoutKind::Tree => "tree",
            LayoutKind::Force => "force",
        };
        f.write_str(name)
    }
}

impl FromStr for LayoutKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "radial" => Ok(LayoutKind::Radial),
            "cluster" | "dendrogram" => Ok(LayoutKind::Cluster),
            "tree" | "hierarchical" => Ok(LayoutKind::Tree),
            "force" => Ok(LayoutKind::Force),
            other => Err(format!("unknown layout: {other}")),
        }
    }
}

pub fn layouter_for(kind: LayoutKind, settings: &LayoutSettings) -> Box<dyn FamilyLayouter> {
    match kind {
        LayoutKind::Radial => Box::new(RadialLayouter::new(settings.clone())),
        LayoutKind::Cluster => Box::new(ClusterLayouter::new(settings.clone())),
        LayoutKind::Tree => Box::new(TreeLayouter::new(settings.clone())),
        LayoutKind::Force => Box::new(ForceLayouter::new(settings.clone())),
    }
}

// ============================================================================
// Shared assembly
// ============================================================================

pub(crate) fn compute_bounds(nodes: &[PositionedNode], padding: f32) -> Rect {
    let Some(first) = nodes.first() else {
        return Rect::default();
    };
    let mut min = first.position;
    let mut max = first.position;
    for node in nodes {
        min.x = min.x.min(node.position.x);
        min.y = min.y.min(node.position.y);
        max.x = max.x.max(node.position.x);
        max.y = max.y.max(node.position.y);
    }
    Rect {
        min: Vec2::new(min.x - padding, min.y - padding),
        max: Vec2::new(max.x + padding, max.y + padding),
    }
}

/// Turns per-node positions into a [`FamilyLayout`], routing links with `route`.
pub(crate) fn assemble_layout(
    graph: &FamilyGraph<'_>,
    positions: &[Vec2],
    generations: &[i32],
    settings: &LayoutSettings,
    route: impl Fn(Vec2, Vec2) -> Vec<Vec2>,
) -> FamilyLayout {
    let nodes: Vec<PositionedNode> = graph
        .node_indices()
        .map(|idx| {
            let person = &graph[idx];
            let generation = generations[idx.0];
            PositionedNode {
                person_id: person.id.clone(),
                name: person.name.clone(),
                position: positions[idx.0],
                generation,
                is_self: person.is_self,
                colors: get_node_colors_with(&settings.palette, generation, person.is_self),
            }
        })
        .collect();

    let links = graph
        .edges()
        .iter()
        .map(|edge| LayoutLink {
            connection_id: edge.connection.id.clone(),
            from: edge.connection.from_person_id.clone(),
            to: edge.connection.to_person_id.clone(),
            relationship: edge.connection.relationship_type,
            route: route(positions[edge.source.0], positions[edge.target.0]),
            style: get_link_style(edge.connection.relationship_type, false),
        })
        .collect();

    let bounds = compute_bounds(&nodes, settings.node_radius);
    FamilyLayout {
        nodes,
        links,
        bounds,
    }
}

pub(crate) fn straight_route(from: Vec2, to: Vec2) -> Vec<Vec2> {
    vec![from, to]
}

/// Renumbers ranks to 0..k keeping their order.
fn compress_ranks(ranks: &mut [i32]) {
    let mut unique: Vec<i32> = ranks.to_vec();
    unique.sort_unstable();
    unique.dedup();
    let remap: HashMap<i32, i32> = unique
        .iter()
        .enumerate()
        .map(|(i, rank)| (*rank, i as i32))
        .collect();
    for rank in ranks.iter_mut() {
        if let Some(&new_rank) = remap.get(rank) {
            *rank = new_rank;
        }
    }
}

/// Node indices per compressed generation row, input order within a row.
pub(crate) fn generation_rows(graph: &FamilyGraph<'_>, generations: &[i32]) -> Vec<Vec<NodeIndex>> {
    let mut ranks = generations.to_vec();
    compress_ranks(&mut ranks);
    let row_count = ranks.iter().copied().max().map(|r| r as usize + 1).unwrap_or(0);
    let mut rows = vec![Vec::new(); row_count];
    for idx in graph.node_indices() {
        rows[ranks[idx.0] as usize].push(idx);
    }
    rows
}

/// Spacing that fits `count` gaps into `available`, capped at `preferred`.
pub(crate) fn fit_spacing(preferred: f32, available: f32, count: usize) -> f32 {
    if count == 0 {
        return 0.0;
    }
    preferred.min(available.max(0.0) / count as f32)
}

// ============================================================================
// Tree layout
// ============================================================================

/// Top-down generational rows, the default family tree view.
///
/// Rows are generations; within a row nodes are ordered by the barycenter of
/// their parents and children to keep links short and uncrossed.
pub struct TreeLayouter {
    pub settings: LayoutSettings,
}

struct GenerationalNeighbors {
    parents: Vec<Vec<NodeIndex>>,
    children: Vec<Vec<NodeIndex>>,
}

impl TreeLayouter {
    const BARYCENTER_PASSES: usize = 2;

    pub fn new(settings: LayoutSettings) -> Self {
        Self { settings }
    }

    fn neighbors(graph: &FamilyGraph<'_>) -> GenerationalNeighbors {
        let mut neighbors = GenerationalNeighbors {
            parents: vec![Vec::new(); graph.node_count()],
            children: vec![Vec::new(); graph.node_count()],
        };
        for (parent, child) in graph.generational_pairs() {
            neighbors.parents[child.0].push(parent);
            neighbors.children[parent.0].push(child);
        }
        neighbors
    }

    fn order_row_by_barycenter(
        row: &mut [NodeIndex],
        slots: &[f32],
        neighbors_by_node: &[Vec<NodeIndex>],
    ) {
        let barycenters: Vec<(NodeIndex, f32)> = row
            .iter()
            .map(|&idx| {
                let neighbors = &neighbors_by_node[idx.0];
                let barycenter = if neighbors.is_empty() {
                    slots[idx.0]
                } else {
                    neighbors.iter().map(|n| slots[n.0]).sum::<f32>() / neighbors.len() as f32
                };
                (idx, barycenter)
            })
            .collect();

        let lookup: HashMap<NodeIndex, f32> = barycenters.into_iter().collect();
        // Stable sort keeps input order for ties, which keeps the layout deterministic.
        row.sort_by(|a, b| {
            lookup[a]
                .partial_cmp(&lookup[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    fn assign_slots(row: &[NodeIndex], slots: &mut [f32]) {
        let offset = (row.len() as f32 - 1.0) / 2.0;
        for (i, idx) in row.iter().enumerate() {
            slots[idx.0] = i as f32 - offset;
        }
    }

    fn run_barycenter_passes(
        rows: &mut [Vec<NodeIndex>],
        slots: &mut [f32],
        neighbors: &GenerationalNeighbors,
    ) {
        for _ in 0..Self::BARYCENTER_PASSES {
            for i in 1..rows.len() {
                Self::order_row_by_barycenter(&mut rows[i], slots, &neighbors.parents);
                Self::assign_slots(&rows[i], slots);
            }
            for i in (0..rows.len().saturating_sub(1)).rev() {
                Self::order_row_by_barycenter(&mut rows[i], slots, &neighbors.children);
                Self::assign_slots(&rows[i], slots);
            }
        }
    }
}

impl Default for TreeLayouter {
    fn default() -> Self {
        Self::new(LayoutSettings::default())
    }
}

impl FamilyLayouter for TreeLayouter {
    fn name(&self) -> &'static str {
        "tree"
    }

    fn layout(
        &self,
        persons: &[Person],
        connections: &[Connection],
        canvas: Canvas,
    ) -> FamilyLayout {
        let graph = FamilyGraph::new(persons, connections);
        if graph.is_empty() {
            return FamilyLayout::default();
        }

        let generations = generation_levels(&graph);
        let mut rows = generation_rows(&graph, &generations);
        let neighbors = Self::neighbors(&graph);

        let mut slots = vec![0.0f32; graph.node_count()];
        for row in &rows {
            Self::assign_slots(row, &mut slots);
        }
        Self::run_barycenter_passes(&mut rows, &mut slots, &neighbors);

        let settings = &self.settings;
        let widest = rows.iter().map(|r| r.len()).max().unwrap_or(1);
        let layer_spacing = fit_spacing(
            settings.layer_spacing,
            canvas.height - 2.0 * settings.margin,
            rows.len().saturating_sub(1),
        );
        let node_spacing = fit_spacing(
            settings.node_spacing,
            canvas.width - 2.0 * settings.margin,
            widest.saturating_sub(1),
        );

        let center = canvas.center();
        let top = center.y - layer_spacing * (rows.len() as f32 - 1.0) / 2.0;
        let mut positions = vec![Vec2::default(); graph.node_count()];
        for (rank, row) in rows.iter().enumerate() {
            let y = top + rank as f32 * layer_spacing;
            for idx in row {
                positions[idx.0] = Vec2::new(center.x + slots[idx.0] * node_spacing, y);
            }
        }

        tracing::debug!(
            "Tree layout placed {} people in {} rows",
            graph.node_count(),
            rows.len()
        );
        assemble_layout(&graph, &positions, &generations, settings, straight_route)
    }
}
