//! Force-directed layout.
//!
//! Fruchterman-Reingold style: every pair repels, every link pulls its ends
//! towards the configured rest length and a weak pull keeps the family near
//! the canvas center. The starting circle follows input order and no
//! randomness is involved, so identical input gives identical output.

use crate::generation::generation_levels;
use crate::graph::{FamilyGraph, Vec2};
use crate::layout::{
    Canvas, FamilyLayout, FamilyLayouter, LayoutSettings, assemble_layout, straight_route,
};
use kinship_core::{Connection, Person};
use std::f32::consts::{FRAC_PI_2, TAU};

const MIN_DISTANCE: f32 = 0.01;
const GRAVITY: f32 = 0.05;

pub struct ForceLayouter {
    pub settings: LayoutSettings,
}

impl ForceLayouter {
    pub fn new(settings: LayoutSettings) -> Self {
        Self { settings }
    }

    fn initial_positions(count: usize, center: Vec2, radius: f32) -> Vec<Vec2> {
        (0..count)
            .map(|i| {
                let angle = -FRAC_PI_2 + TAU * i as f32 / count as f32;
                Vec2::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                )
            })
            .collect()
    }

    /// Unit-ish direction from `b` to `a`, with a fixed nudge for coincident points.
    fn separation(a: Vec2, b: Vec2, i: usize, j: usize) -> (Vec2, f32) {
        let dx = a.x - b.x;
        let dy = a.y - b.y;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance < MIN_DISTANCE {
            let sign = if i < j { 1.0 } else { -1.0 };
            return (Vec2::new(sign, 0.0), MIN_DISTANCE);
        }
        (Vec2::new(dx / distance, dy / distance), distance)
    }

    fn clamp_to_canvas(position: Vec2, canvas: Canvas, margin: f32) -> Vec2 {
        let clamp = |value: f32, extent: f32| {
            if extent <= 2.0 * margin {
                extent / 2.0
            } else {
                value.clamp(margin, extent - margin)
            }
        };
        Vec2::new(clamp(position.x, canvas.width), clamp(position.y, canvas.height))
    }

    fn simulate(&self, graph: &FamilyGraph<'_>, canvas: Canvas) -> Vec<Vec2> {
        let settings = &self.settings;
        let n = graph.node_count();
        let center = canvas.center();
        let max_radius = (canvas.width.min(canvas.height) / 2.0 - settings.margin).max(0.0);
        let start_radius = (settings.force_link_length * n as f32 / TAU).min(max_radius);
        let mut positions = Self::initial_positions(n, center, start_radius);

        let k = settings.force_link_length.max(1.0);
        let links: Vec<(usize, usize)> = graph
            .edges()
            .iter()
            .map(|edge| (edge.source.0, edge.target.0))
            .collect();

        let iterations = settings.force_iterations;
        let initial_temperature = canvas.width.min(canvas.height) / 10.0;
        let mut displacement = vec![Vec2::default(); n];

        for step in 0..iterations {
            displacement.fill(Vec2::default());

            for i in 0..n {
                for j in (i + 1)..n {
                    let (dir, distance) = Self::separation(positions[i], positions[j], i, j);
                    let force = k * k / distance;
                    displacement[i].x += dir.x * force;
                    displacement[i].y += dir.y * force;
                    displacement[j].x -= dir.x * force;
                    displacement[j].y -= dir.y * force;
                }
            }

            for &(a, b) in &links {
                let (dir, distance) = Self::separation(positions[a], positions[b], a, b);
                let force = distance * distance / k;
                displacement[a].x -= dir.x * force;
                displacement[a].y -= dir.y * force;
                displacement[b].x += dir.x * force;
                displacement[b].y += dir.y * force;
            }

            for (position, delta) in positions.iter().zip(displacement.iter_mut()) {
                delta.x += (center.x - position.x) * GRAVITY;
                delta.y += (center.y - position.y) * GRAVITY;
            }

            // Linear cooling caps how far a node may move this step.
            let temperature = initial_temperature * (1.0 - step as f32 / iterations as f32);
            for (position, delta) in positions.iter_mut().zip(&displacement) {
                let length = (delta.x * delta.x + delta.y * delta.y).sqrt();
                if length < f32::EPSILON {
                    continue;
                }
                let capped = length.min(temperature);
                let moved = Vec2::new(
                    position.x + delta.x / length * capped,
                    position.y + delta.y / length * capped,
                );
                *position = Self::clamp_to_canvas(moved, canvas, settings.margin);
            }
        }

        positions
    }
}

impl Default for ForceLayouter {
    fn default() -> Self {
        Self::new(LayoutSettings::default())
    }
}

impl FamilyLayouter for ForceLayouter {
    fn name(&self) -> &'static str {
        "force"
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

        let positions = if graph.node_count() == 1 {
            vec![canvas.center()]
        } else {
            self.simulate(&graph, canvas)
        };

        tracing::debug!(
            "Force layout ran {} iterations over {} people",
            self.settings.force_iterations,
            graph.node_count()
        );
        let generations = generation_levels(&graph);
        assemble_layout(
            &graph,
            &positions,
            &generations,
            &self.settings,
            straight_route,
        )
    }
}
