//! Radial layout: one concentric ring per generation.

use crate::generation::generation_levels;
use crate::graph::{FamilyGraph, NodeIndex, Vec2};
use crate::layout::{
    Canvas, FamilyLayout, FamilyLayouter, LayoutSettings, assemble_layout, fit_spacing,
    generation_rows, straight_route,
};
use kinship_core::{Connection, Person};
use std::f32::consts::{FRAC_PI_2, TAU};

pub struct RadialLayouter {
    pub settings: LayoutSettings,
}

impl RadialLayouter {
    pub fn new(settings: LayoutSettings) -> Self {
        Self { settings }
    }

    /// Radius per ring. A lone innermost person sits at the center.
    fn ring_radii(rows: &[Vec<NodeIndex>], spacing: f32) -> Vec<f32> {
        let centered = rows.first().is_some_and(|r| r.len() == 1);
        (0..rows.len())
            .map(|ring| {
                if centered {
                    ring as f32 * spacing
                } else {
                    (ring + 1) as f32 * spacing
                }
            })
            .collect()
    }

    fn angle_of(position: Vec2, center: Vec2) -> f32 {
        (position.y - center.y).atan2(position.x - center.x)
    }

    /// Orders an outer ring by the mean angle of each node's already placed parents.
    fn order_ring(
        ring: &mut [NodeIndex],
        parents: &[Vec<NodeIndex>],
        placed: &[Option<Vec2>],
        center: Vec2,
    ) {
        let mut keys: Vec<(NodeIndex, Option<f32>)> = ring
            .iter()
            .map(|&idx| {
                let angles: Vec<f32> = parents[idx.0]
                    .iter()
                    .filter_map(|p| placed[p.0])
                    .map(|pos| Self::angle_of(pos, center))
                    .collect();
                if angles.is_empty() {
                    (idx, None)
                } else {
                    (idx, Some(angles.iter().sum::<f32>() / angles.len() as f32))
                }
            })
            .collect();

        // Nodes without placed parents keep their relative order after the rest.
        keys.sort_by(|a, b| match (a.1, b.1) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        for (slot, (idx, _)) in ring.iter_mut().zip(keys) {
            *slot = idx;
        }
    }
}

impl Default for RadialLayouter {
    fn default() -> Self {
        Self::new(LayoutSettings::default())
    }
}

impl FamilyLayouter for RadialLayouter {
    fn name(&self) -> &'static str {
        "radial"
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

        let mut parents = vec![Vec::new(); graph.node_count()];
        for (parent, child) in graph.generational_pairs() {
            parents[child.0].push(parent);
        }

        let center = canvas.center();
        let max_radius = canvas.width.min(canvas.height) / 2.0 - self.settings.margin;
        let centered = rows.first().is_some_and(|r| r.len() == 1);
        let gaps = if centered {
            rows.len().saturating_sub(1)
        } else {
            rows.len()
        };
        let spacing = fit_spacing(self.settings.ring_spacing, max_radius, gaps);
        let radii = Self::ring_radii(&rows, spacing);

        let mut placed: Vec<Option<Vec2>> = vec![None; graph.node_count()];
        for (ring, row) in rows.iter_mut().enumerate() {
            if ring > 0 {
                Self::order_ring(row, &parents, &placed, center);
            }
            let radius = radii[ring];
            let count = row.len() as f32;
            for (i, idx) in row.iter().enumerate() {
                let angle = -FRAC_PI_2 + TAU * i as f32 / count;
                placed[idx.0] = Some(Vec2::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                ));
            }
        }

        let positions: Vec<Vec2> = placed
            .into_iter()
            .map(|p| p.unwrap_or(center))
            .collect();

        tracing::debug!(
            "Radial layout placed {} people on {} rings",
            graph.node_count(),
            rows.len()
        );
        assemble_layout(
            &graph,
            &positions,
            &generations,
            &self.settings,
            straight_route,
        )
    }
}
