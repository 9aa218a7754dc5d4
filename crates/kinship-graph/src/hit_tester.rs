//! Click, zoom and pan support for any rendering surface.
//!
//! The renderer owns the pixels; it forwards screen coordinates here and gets
//! back which person (if any) was hit.

use crate::graph::Vec2;
use crate::layout::FamilyLayout;
use kinship_core::{Person, PersonId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 4.0;

/// Maps world (layout) coordinates to screen coordinates: `screen = world * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub zoom: f32,
    pub pan: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::default(),
        }
    }
}

impl Viewport {
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            world.x * self.zoom + self.pan.x,
            world.y * self.zoom + self.pan.y,
        )
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            (screen.x - self.pan.x) / self.zoom,
            (screen.y - self.pan.y) / self.zoom,
        )
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan.x += delta.x;
        self.pan.y += delta.y;
    }

    /// Multiplies the zoom by `factor`, keeping the world point under `anchor` fixed on screen.
    pub fn zoom_at(&mut self, factor: f32, anchor: Vec2) {
        if factor <= 0.0 || !factor.is_finite() {
            return;
        }
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() <= f32::EPSILON {
            return;
        }
        let world = self.screen_to_world(anchor);
        self.zoom = new_zoom;
        let moved = self.world_to_screen(world);
        self.pan_by(Vec2::new(anchor.x - moved.x, anchor.y - moved.y));
    }
}

/// Uniform grid over node positions, sized to the hit radius.
#[derive(Debug, Clone)]
pub struct HitTester {
    radius: f32,
    cell_size: f32,
    nodes: Vec<(PersonId, Vec2)>,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

fn cell_for(point: Vec2, cell_size: f32) -> (i32, i32) {
    (
        (point.x / cell_size).floor() as i32,
        (point.y / cell_size).floor() as i32,
    )
}

impl HitTester {
    pub fn from_layout(layout: &FamilyLayout, radius: f32) -> Self {
        let radius = radius.max(f32::EPSILON);
        let cell_size = radius * 2.0;
        let nodes: Vec<(PersonId, Vec2)> = layout
            .nodes
            .iter()
            .map(|n| (n.person_id.clone(), n.position))
            .collect();

        let mut cells: HashMap<(i32, i32), Vec<usize>> = HashMap::new();
        for (i, (_, position)) in nodes.iter().enumerate() {
            cells.entry(cell_for(*position, cell_size)).or_default().push(i);
        }

        Self {
            radius,
            cell_size,
            nodes,
            cells,
        }
    }

    /// Nearest node within the hit radius of a world-space point.
    ///
    /// Ties go to the node listed first in the layout.
    pub fn hit(&self, world: Vec2) -> Option<&PersonId> {
        let (cx, cy) = cell_for(world, self.cell_size);
        let mut best: Option<(usize, f32)> = None;
        for y in (cy - 1)..=(cy + 1) {
            for x in (cx - 1)..=(cx + 1) {
                let Some(candidates) = self.cells.get(&(x, y)) else {
                    continue;
                };
                for &i in candidates {
                    let distance = self.nodes[i].1.distance(world);
                    if distance > self.radius {
                        continue;
                    }
                    let better = match best {
                        None => true,
                        Some((best_i, best_d)) => {
                            distance < best_d || (distance == best_d && i < best_i)
                        }
                    };
                    if better {
                        best = Some((i, distance));
                    }
                }
            }
        }
        best.map(|(i, _)| &self.nodes[i].0)
    }

    pub fn hit_screen(&self, screen: Vec2, viewport: &Viewport) -> Option<&PersonId> {
        self.hit(viewport.screen_to_world(screen))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Turns forwarded clicks into person selections and notifies the host.
pub struct SelectionController<'a> {
    persons: &'a [Person],
    hit_tester: HitTester,
    on_click: Box<dyn FnMut(&Person) + 'a>,
    selected: Option<PersonId>,
}

impl<'a> SelectionController<'a> {
    pub fn new(
        persons: &'a [Person],
        layout: &FamilyLayout,
        radius: f32,
        on_click: impl FnMut(&Person) + 'a,
    ) -> Self {
        Self {
            persons,
            hit_tester: HitTester::from_layout(layout, radius),
            on_click: Box::new(on_click),
            selected: None,
        }
    }

    /// Handles a click in screen space. Clicking empty space clears the selection.
    pub fn click(&mut self, screen: Vec2, viewport: &Viewport) -> Option<&PersonId> {
        let hit = self.hit_tester.hit_screen(screen, viewport).cloned();
        self.selected = None;

        let id = hit?;
        let Some(person) = self.persons.iter().find(|p| p.id == id) else {
            tracing::warn!("Clicked node {} has no matching person", id);
            return None;
        };
        (self.on_click)(person);
        self.selected = Some(id);
        self.selected.as_ref()
    }

    pub fn selected(&self) -> Option<&PersonId> {
        self.selected.as_ref()
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Rebuilds hit areas after a new layout; the selection survives if the person is still placed.
    pub fn relayout(&mut self, layout: &FamilyLayout, radius: f32) {
        self.hit_tester = HitTester::from_layout(layout, radius);
        if let Some(id) = &self.selected
            && layout.node(id).is_none()
        {
            self.selected = None;
        }
    }
}
