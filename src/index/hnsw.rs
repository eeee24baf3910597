//! Graph-based approximate nearest neighbor index (HNSW).
//!
//! Nodes live on exponentially distributed layers; a query descends from the
//! top layer greedily, then runs a best-first beam search at layer 0.
//! Distances are cosine distances (`1 − dot`) over the shared normalized
//! vector arena owned by the enclosing index. Build and search breadth are
//! the `ef_construction` / `ef_search` parameters from `config`.

use crate::config;
use crate::index::visited::VisitedSet;
use crate::index::dot;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

thread_local! {
    /// Reusable visited set, shared by all searches on this thread.
    static QUERY_VISITED: RefCell<VisitedSet> = RefCell::new(VisitedSet::with_capacity(0));
}

/// HNSW graph structure. Vector data lives in the enclosing index's arena;
/// this holds only adjacency lists and layer assignments.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct HnswGraph {
    m: usize,
    m_max0: usize,
    ef_construction: usize,
    ef_search: usize,
    max_layers: usize,
    /// `adjacency[node][layer]` — neighbor ordinals per layer.
    adjacency: Vec<Vec<Vec<u32>>>,
    node_levels: Vec<u8>,
    entry_point: Option<u32>,
    max_layer: usize,
}

impl HnswGraph {
    pub(crate) fn new() -> Self {
        Self {
            m: config::HNSW_M,
            m_max0: config::HNSW_M_MAX0,
            ef_construction: config::HNSW_EF_CONSTRUCTION,
            ef_search: config::HNSW_EF_SEARCH,
            max_layers: config::HNSW_MAX_LAYERS,
            adjacency: Vec::new(),
            node_levels: Vec::new(),
            entry_point: None,
            max_layer: 0,
        }
    }

    pub(crate) fn node_count(&self) -> usize {
        self.node_levels.len()
    }

    /// Draws a layer for a new node: `floor(−ln(u) / ln(M))`.
    fn random_level(&self) -> usize {
        let ml = 1.0 / (self.m as f64).ln();
        let u: f64 = rand::random();
        ((-u.ln() * ml).floor() as usize).min(self.max_layers - 1)
    }

    /// Inserts the node at `ordinal` into the graph. The node's vector must
    /// already be present in `arena`; `ordinal` must equal the current node
    /// count.
    pub(crate) fn insert(&mut self, ordinal: u32, arena: &[f32], dimension: usize) {
        let level = self.random_level();

        let Some(entry_point) = self.entry_point else {
            self.adjacency.push(vec![Vec::new(); level + 1]);
            self.node_levels.push(level as u8);
            self.entry_point = Some(ordinal);
            self.max_layer = level;
            return;
        };

        let vector = node_vector(arena, dimension, ordinal);
        let mut visited = VisitedSet::with_capacity(self.node_count() + 1);
        let mut current_ep = entry_point;

        // Greedy descent from the top layer down to the node's level + 1.
        for layer in (level + 1..=self.max_layer).rev() {
            let found = self.search_layer(
                arena,
                dimension,
                vector,
                &[current_ep],
                1,
                layer,
                &mut visited,
            );
            if let Some(&(_, nearest)) = found.first() {
                current_ep = nearest;
            }
        }

        // Beam search each layer from the node's level down, collecting
        // neighbor candidates before the node itself is linked in.
        let top = level.min(self.max_layer);
        let mut new_links: Vec<Vec<u32>> = vec![Vec::new(); level + 1];
        let mut entry_points = vec![current_ep];
        for layer in (0..=top).rev() {
            let candidates = self.search_layer(
                arena,
                dimension,
                vector,
                &entry_points,
                self.ef_construction,
                layer,
                &mut visited,
            );
            let cap = self.link_capacity(layer);
            new_links[layer] = self
                .select_diverse(arena, dimension, &candidates, cap)
                .into_iter()
                .map(|(_, id)| id)
                .collect();

            entry_points.clear();
            entry_points.extend(candidates.iter().map(|&(_, id)| id));
            if entry_points.is_empty() {
                entry_points.push(entry_point);
            }
        }

        self.adjacency.push(new_links);
        self.node_levels.push(level as u8);

        // Back-link neighbors and prune any that exceed capacity.
        for layer in 0..=top {
            let cap = self.link_capacity(layer);
            let linked: Vec<u32> = self.adjacency[ordinal as usize][layer].clone();
            for neighbor in linked {
                let n = neighbor as usize;
                while self.adjacency[n].len() <= layer {
                    self.adjacency[n].push(Vec::new());
                }
                self.adjacency[n][layer].push(ordinal);

                if self.adjacency[n][layer].len() > cap {
                    let base = node_vector(arena, dimension, neighbor);
                    let candidates: Vec<(f32, u32)> = self.adjacency[n][layer]
                        .iter()
                        .map(|&id| {
                            (cosine_distance(base, node_vector(arena, dimension, id)), id)
                        })
                        .collect();
                    self.adjacency[n][layer] = self
                        .select_diverse(arena, dimension, &candidates, cap)
                        .into_iter()
                        .map(|(_, id)| id)
                        .collect();
                }
            }
        }

        if level > self.max_layer {
            self.max_layer = level;
            self.entry_point = Some(ordinal);
        }
    }

    /// Returns up to `k` `(similarity, ordinal)` pairs, best first.
    pub(crate) fn search(
        &self,
        arena: &[f32],
        dimension: usize,
        query: &[f32],
        k: usize,
    ) -> Vec<(f32, u32)> {
        let Some(entry_point) = self.entry_point else {
            return Vec::new();
        };

        QUERY_VISITED.with(|cell| {
            let mut visited = cell.borrow_mut();
            visited.grow(self.node_count());

            let mut current_ep = entry_point;
            for layer in (1..=self.max_layer).rev() {
                let found = self.search_layer(
                    arena,
                    dimension,
                    query,
                    &[current_ep],
                    1,
                    layer,
                    &mut visited,
                );
                if let Some(&(_, nearest)) = found.first() {
                    current_ep = nearest;
                }
            }

            let ef = self.ef_search.max(k);
            let mut found = self.search_layer(
                arena,
                dimension,
                query,
                &[current_ep],
                ef,
                0,
                &mut visited,
            );
            found.truncate(k);
            found
                .into_iter()
                .map(|(distance, id)| (1.0 - distance, id))
                .collect()
        })
    }

    fn link_capacity(&self, layer: usize) -> usize {
        if layer == 0 {
            self.m_max0
        } else {
            self.m
        }
    }

    /// Best-first beam search over one layer. Returns up to `ef` nodes as
    /// `(distance, ordinal)`, closest first.
    #[allow(clippy::too_many_arguments)]
    fn search_layer(
        &self,
        arena: &[f32],
        dimension: usize,
        query: &[f32],
        entry_points: &[u32],
        ef: usize,
        layer: usize,
        visited: &mut VisitedSet,
    ) -> Vec<(f32, u32)> {
        visited.reset();
        // Min-heap of frontier candidates (negated distance), max-heap of results.
        let mut frontier: BinaryHeap<(Reverse<OrderedFloat<f32>>, u32)> =
            BinaryHeap::with_capacity(ef * 2);
        let mut results: BinaryHeap<(OrderedFloat<f32>, u32)> =
            BinaryHeap::with_capacity(ef + 1);

        for &ep in entry_points {
            if visited.mark(ep) {
                let d = cosine_distance(query, node_vector(arena, dimension, ep));
                frontier.push((Reverse(OrderedFloat(d)), ep));
                results.push((OrderedFloat(d), ep));
            }
        }

        while let Some((Reverse(OrderedFloat(candidate_dist)), node)) = frontier.pop() {
            let worst = results.peek().map_or(f32::MAX, |r| r.0 .0);
            if results.len() >= ef && candidate_dist > worst {
                break;
            }

            let node = node as usize;
            if layer >= self.adjacency[node].len() {
                continue;
            }
            for &neighbor in &self.adjacency[node][layer] {
                if !visited.mark(neighbor) {
                    continue;
                }
                let d = cosine_distance(query, node_vector(arena, dimension, neighbor));
                let worst = results.peek().map_or(f32::MAX, |r| r.0 .0);
                if results.len() < ef || d < worst {
                    frontier.push((Reverse(OrderedFloat(d)), neighbor));
                    results.push((OrderedFloat(d), neighbor));
                    if results.len() > ef {
                        results.pop();
                    }
                }
            }
        }

        results
            .into_sorted_vec()
            .into_iter()
            .map(|(OrderedFloat(d), id)| (d, id))
            .collect()
    }

    /// Diverse neighbor selection: a candidate is kept only if it is closer
    /// to the base point than to every already-kept neighbor, which avoids
    /// clusters of near-identical links. Remaining slots are filled with the
    /// closest leftovers.
    fn select_diverse(
        &self,
        arena: &[f32],
        dimension: usize,
        candidates: &[(f32, u32)],
        cap: usize,
    ) -> Vec<(f32, u32)> {
        let mut sorted = candidates.to_vec();
        sorted.sort_unstable_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut kept: Vec<(f32, u32)> = Vec::with_capacity(cap);
        for &(dist_to_base, id) in &sorted {
            if kept.len() >= cap {
                break;
            }
            let candidate = node_vector(arena, dimension, id);
            let diverse = kept.iter().all(|&(_, kept_id)| {
                dist_to_base
                    <= cosine_distance(candidate, node_vector(arena, dimension, kept_id))
            });
            if diverse {
                kept.push((dist_to_base, id));
            }
        }

        if kept.len() < cap {
            for &(dist, id) in &sorted {
                if kept.len() >= cap {
                    break;
                }
                if !kept.iter().any(|&(_, kept_id)| kept_id == id) {
                    kept.push((dist, id));
                }
            }
        }
        kept
    }
}

#[inline]
fn node_vector(arena: &[f32], dimension: usize, ordinal: u32) -> &[f32] {
    let start = ordinal as usize * dimension;
    &arena[start..start + dimension]
}

/// Cosine distance between unit vectors: `1 − dot`. Lower is closer.
#[inline]
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - dot(a, b)
}
