//! Generation-stamped visited set for HNSW graph traversal.
//!
//! A plain `HashSet<u32>` allocates per query; this keeps one `Vec<u32>` of
//! generation stamps and bumps a counter to reset, so repeated searches over
//! the same graph reuse the allocation.

/// Visited markers for graph traversal, reset in O(1) by bumping a generation.
#[derive(Debug)]
pub struct VisitedSet {
    stamps: Vec<u32>,
    generation: u32,
}

impl VisitedSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stamps: vec![0u32; capacity],
            generation: 1,
        }
    }

    /// Starts a new traversal. Amortized O(1); the stamp array is only
    /// zeroed when the generation counter wraps.
    pub fn reset(&mut self) {
        if self.generation == u32::MAX {
            self.stamps.fill(0);
            self.generation = 1;
        } else {
            self.generation += 1;
        }
    }

    /// Grows the stamp array to cover at least `capacity` nodes.
    pub fn grow(&mut self, capacity: usize) {
        if capacity > self.stamps.len() {
            self.stamps.resize(capacity, 0);
        }
    }

    /// Marks `id` visited. Returns `true` if it was not already marked in
    /// the current generation.
    #[inline]
    pub fn mark(&mut self, id: u32) -> bool {
        let slot = &mut self.stamps[id as usize];
        if *slot == self.generation {
            false
        } else {
            *slot = self.generation;
            true
        }
    }
}
