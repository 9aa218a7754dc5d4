//! Dendrogram layout over the hierarchy.
//!
//! Depth in the hierarchy picks the horizontal band, leaves are spread evenly
//! along the vertical axis and each parent sits at the mean of its children.
//! Links are routed orthogonally with an elbow halfway between the bands.

use crate::generation::generation_levels;
use crate::graph::{FamilyGraph, Vec2};
use crate::hierarchy::{HierarchyNode, build_hierarchy};
use crate::layout::{
    Canvas, FamilyLayout, FamilyLayouter, LayoutSettings, assemble_layout, fit_spacing,
};
use kinship_core::{Connection, Person};

pub struct ClusterLayouter {
    pub settings: LayoutSettings,
}

struct Placement {
    /// Leaf slot (fractional for inner nodes) and depth per hierarchy node, pre-order.
    slots: Vec<(f32, usize)>,
    next_leaf: usize,
}

impl ClusterLayouter {
    pub fn new(settings: LayoutSettings) -> Self {
        Self { settings }
    }

    /// Returns this node's slot after placing its subtree.
    fn place(
        node: &HierarchyNode,
        depth: usize,
        graph: &FamilyGraph<'_>,
        placement: &mut Placement,
    ) -> f32 {
        let slot = if node.is_leaf() {
            let slot = placement.next_leaf as f32;
            placement.next_leaf += 1;
            slot
        } else {
            let child_slots: Vec<f32> = node
                .children
                .iter()
                .map(|child| Self::place(child, depth + 1, graph, placement))
                .collect();
            child_slots.iter().sum::<f32>() / child_slots.len() as f32
        };

        if let Some(idx) = graph.index_of(&node.person.id) {
            placement.slots[idx.0] = (slot, depth);
        }
        slot
    }

    pub(crate) fn elbow_route(from: Vec2, to: Vec2) -> Vec<Vec2> {
        if (from.y - to.y).abs() < f32::EPSILON || (from.x - to.x).abs() < f32::EPSILON {
            return vec![from, to];
        }
        let mid_x = (from.x + to.x) / 2.0;
        vec![from, Vec2::new(mid_x, from.y), Vec2::new(mid_x, to.y), to]
    }
}

impl Default for ClusterLayouter {
    fn default() -> Self {
        Self::new(LayoutSettings::default())
    }
}

impl FamilyLayouter for ClusterLayouter {
    fn name(&self) -> &'static str {
        "cluster"
    }

    fn layout(
        &self,
        persons: &[Person],
        connections: &[Connection],
        canvas: Canvas,
    ) -> FamilyLayout {
        let graph = FamilyGraph::new(persons, connections);
        let Some(root) = build_hierarchy(persons, connections) else {
            return FamilyLayout::default();
        };

        let mut placement = Placement {
            slots: vec![(0.0, 0); graph.node_count()],
            next_leaf: 0,
        };
        Self::place(&root, 0, &graph, &mut placement);

        let leaves = placement.next_leaf;
        let depth = root.depth();
        let settings = &self.settings;
        let band = fit_spacing(
            settings.layer_spacing,
            canvas.width - 2.0 * settings.margin,
            depth.saturating_sub(1),
        );
        let leaf_spacing = fit_spacing(
            settings.node_spacing,
            canvas.height - 2.0 * settings.margin,
            leaves.saturating_sub(1),
        );

        let center = canvas.center();
        let left = center.x - band * (depth as f32 - 1.0) / 2.0;
        let slot_offset = (leaves as f32 - 1.0) / 2.0;
        let positions: Vec<Vec2> = placement
            .slots
            .iter()
            .map(|&(slot, d)| {
                Vec2::new(
                    left + d as f32 * band,
                    center.y + (slot - slot_offset) * leaf_spacing,
                )
            })
            .collect();

        let generations = generation_levels(&graph);
        tracing::debug!(
            "Cluster layout placed {} people across {} bands",
            graph.node_count(),
            depth
        );
        assemble_layout(
            &graph,
            &positions,
            &generations,
            settings,
            Self::elbow_route,
        )
    }
}
