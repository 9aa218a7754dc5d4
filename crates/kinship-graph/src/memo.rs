//! Explicit layout memoization.
//!
//! The cache key is a hash of the full input content, so any edit to a person,
//! a connection or the canvas produces a fresh layout. Nothing is global: each
//! view owns its own [`MemoizedLayout`].

use crate::layout::{Canvas, FamilyLayout, FamilyLayouter};
use kinship_core::{Connection, Person};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn content_hash(persons: &[Person], connections: &[Connection], canvas: Canvas) -> u64 {
    let mut hasher = DefaultHasher::new();
    persons.hash(&mut hasher);
    connections.hash(&mut hasher);
    canvas.width.to_bits().hash(&mut hasher);
    canvas.height.to_bits().hash(&mut hasher);
    hasher.finish()
}

pub struct MemoizedLayout<L> {
    layouter: L,
    cached: Option<(u64, FamilyLayout)>,
    computations: usize,
}

impl<L: FamilyLayouter> MemoizedLayout<L> {
    pub fn new(layouter: L) -> Self {
        Self {
            layouter,
            cached: None,
            computations: 0,
        }
    }

    pub fn layout(
        &mut self,
        persons: &[Person],
        connections: &[Connection],
        canvas: Canvas,
    ) -> &FamilyLayout {
        let key = content_hash(persons, connections, canvas);
        if self.cached.as_ref().is_some_and(|(cached_key, _)| *cached_key != key) {
            self.cached = None;
        }

        let layouter = &self.layouter;
        let computations = &mut self.computations;
        let (_, layout) = self.cached.get_or_insert_with(|| {
            tracing::debug!("Recomputing {} layout (key {:016x})", layouter.name(), key);
            *computations += 1;
            (key, layouter.layout(persons, connections, canvas))
        });
        layout
    }

    /// How many times the wrapped layouter actually ran.
    pub fn computations(&self) -> usize {
        self.computations
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub fn layouter(&self) -> &L {
        &self.layouter
    }
}
