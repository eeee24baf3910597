//! Vector similarity index.
//!
//! One index owns a contiguous `f32` arena of L2-normalized embeddings plus a
//! parallel metadata table of `Arc<Document>` handles, addressed by ordinal.
//! Three interchangeable search backends sit behind it:
//!
//! - **Flat** — exact brute-force scan, always available
//! - **IVF** — k-means partitioned inverted lists, needs a training batch
//! - **HNSW** — layered proximity graph for sublinear approximate search
//!
//! All backends score by inner product over unit vectors (cosine similarity)
//! and return results in descending order, ties broken by insertion order.
//! An IVF index that never receives a large enough training batch degrades
//! permanently to the Flat scan; the switch is recorded in [`IndexStats`].

mod flat;
mod hnsw;
mod ivf;
pub(crate) mod persistence;
mod visited;

use crate::config;
use crate::document::Document;
use crate::error::{Error, Result};
use hnsw::HnswGraph;
use ivf::IvfIndex;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::path::Path;
use std::sync::Arc;

/// Search backend selection, fixed at index creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexStrategy {
    /// Exact scan over every stored vector.
    Flat,
    /// Inverted-file index; requires a training batch of at least
    /// [`config::IVF_MIN_TRAIN_SAMPLES`] vectors.
    Ivf,
    /// Hierarchical navigable small world graph.
    Hnsw,
}

impl IndexStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexStrategy::Flat => "flat",
            IndexStrategy::Ivf => "ivf",
            IndexStrategy::Hnsw => "hnsw",
        }
    }
}

/// Backend state. `Flat` carries none; the arena itself is the index.
#[derive(Debug, Serialize, Deserialize)]
enum Backend {
    Flat,
    Ivf(IvfIndex),
    Hnsw(HnswGraph),
}

/// One search result: the matched document and its cosine similarity.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub document: Arc<Document>,
    pub score: f32,
    /// Position of the vector in the arena. Stable for the index lifetime.
    pub ordinal: u32,
}

/// Point-in-time snapshot of index state, for logs and health reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexStats {
    pub count: usize,
    pub dimension: usize,
    pub strategy: IndexStrategy,
    /// Whether the backend is ready to serve its configured strategy.
    /// Flat and HNSW are trained from creation; IVF only after a
    /// sufficiently large first batch.
    pub trained: bool,
    /// True when an IVF index permanently degraded to the exact scan.
    pub fell_back: bool,
    /// Approximate arena size: `count × dimension × 4` bytes.
    pub memory_bytes: usize,
}

/// In-memory vector index with pluggable search backend.
#[derive(Debug)]
pub struct VectorIndex {
    dimension: usize,
    strategy: IndexStrategy,
    trained: bool,
    fell_back: bool,
    /// Row-major arena of unit vectors, `count × dimension`.
    vectors: Vec<f32>,
    /// Parallel to the arena: `metadata[ordinal]` describes vector `ordinal`.
    metadata: Vec<Arc<Document>>,
    backend: Backend,
}

impl VectorIndex {
    /// Creates an empty index. An IVF index starts untrained and serves the
    /// exact scan until its first batch arrives.
    pub fn new(strategy: IndexStrategy, dimension: usize) -> Self {
        let (backend, trained) = match strategy {
            IndexStrategy::Flat => (Backend::Flat, true),
            IndexStrategy::Ivf => (Backend::Flat, false),
            IndexStrategy::Hnsw => (Backend::Hnsw(HnswGraph::new()), true),
        };
        Self {
            dimension,
            strategy,
            trained,
            fell_back: false,
            vectors: Vec::new(),
            metadata: Vec::new(),
            backend,
        }
    }

    pub fn count(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// All stored documents in insertion order.
    pub fn documents(&self) -> &[Arc<Document>] {
        &self.metadata
    }

    /// The document at `ordinal`, if in range.
    pub fn document(&self, ordinal: u32) -> Option<Arc<Document>> {
        self.metadata.get(ordinal as usize).cloned()
    }

    /// Adds a batch of embeddings with their documents. Embeddings are
    /// L2-normalized before storage, so callers may pass raw model output.
    ///
    /// The first batch decides an IVF index's fate: at or above
    /// [`config::IVF_MIN_TRAIN_SAMPLES`] vectors it trains the cluster
    /// centroids, below that the index permanently falls back to the exact
    /// scan. Returns the number of documents added.
    pub fn add(&mut self, embeddings: &[Vec<f32>], documents: Vec<Document>) -> Result<usize> {
        if embeddings.len() != documents.len() {
            return Err(Error::BatchMismatch {
                vectors: embeddings.len(),
                documents: documents.len(),
            });
        }
        for vector in embeddings {
            if vector.len() != self.dimension {
                return Err(Error::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }
        if embeddings.is_empty() {
            return Ok(0);
        }

        let mut normalized: Vec<Vec<f32>> = embeddings.to_vec();
        for vector in &mut normalized {
            l2_normalize(vector);
        }

        if self.strategy == IndexStrategy::Ivf && !self.trained && !self.fell_back {
            if normalized.len() >= config::IVF_MIN_TRAIN_SAMPLES {
                self.backend = Backend::Ivf(IvfIndex::train(&normalized, self.dimension));
                self.trained = true;
            } else {
                tracing::warn!(
                    "IVF training batch too small ({} < {}), falling back to exact scan",
                    normalized.len(),
                    config::IVF_MIN_TRAIN_SAMPLES
                );
                self.fell_back = true;
                self.trained = true;
            }
        }

        let added = normalized.len();
        for (vector, document) in normalized.into_iter().zip(documents) {
            let ordinal = self.metadata.len() as u32;
            self.vectors.extend_from_slice(&vector);
            self.metadata.push(Arc::new(document));
            match &mut self.backend {
                Backend::Flat => {}
                Backend::Ivf(ivf) => ivf.insert(ordinal, &vector, self.dimension),
                Backend::Hnsw(graph) => graph.insert(ordinal, &self.vectors, self.dimension),
            }
        }

        tracing::info!(
            "Added {} documents to {} index ({} total)",
            added,
            self.strategy.as_str(),
            self.metadata.len()
        );
        Ok(added)
    }

    /// Returns up to `k` documents with cosine similarity ≥ `threshold`,
    /// best first. The query is normalized before scoring. An empty index
    /// yields an empty result, never an error.
    pub fn search(&self, query: &[f32], k: usize, threshold: f32) -> Result<Vec<SearchHit>> {
        if query.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if self.metadata.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut query = query.to_vec();
        l2_normalize(&mut query);

        let raw = match &self.backend {
            Backend::Flat => flat::scan(&self.vectors, self.dimension, &query, k, threshold),
            Backend::Ivf(ivf) => ivf.search(&self.vectors, self.dimension, &query, k, threshold),
            Backend::Hnsw(graph) => graph
                .search(&self.vectors, self.dimension, &query, k)
                .into_iter()
                .filter(|&(similarity, _)| similarity >= threshold)
                .collect(),
        };

        Ok(raw
            .into_iter()
            .map(|(score, ordinal)| SearchHit {
                document: Arc::clone(&self.metadata[ordinal as usize]),
                score,
                ordinal,
            })
            .collect())
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            count: self.metadata.len(),
            dimension: self.dimension,
            strategy: self.strategy,
            trained: self.trained,
            fell_back: self.fell_back,
            memory_bytes: self.metadata.len() * self.dimension * 4,
        }
    }

    /// Writes the index snapshot pair into `dir` atomically.
    pub fn save(&self, dir: &Path) -> Result<()> {
        persistence::save(self, dir)
    }

    /// Restores an index from a snapshot pair written by [`save`](Self::save).
    pub fn load(dir: &Path) -> Result<Self> {
        persistence::load(dir)
    }
}

/// An exact-scan index sized for [`config::DEFAULT_DIMENSION`] embeddings.
impl Default for VectorIndex {
    fn default() -> Self {
        Self::new(IndexStrategy::Flat, config::DEFAULT_DIMENSION)
    }
}

// ── Shared vector math ─────────────────────────────────────────────────

/// Inner product. Equal to cosine similarity when both slices are unit length.
#[inline]
pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Scales `v` to unit length in place. Zero vectors are left unchanged.
pub(crate) fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Keeps the `k` best `(similarity, ordinal)` pairs from a scored stream.
/// Output is descending by similarity; equal scores keep insertion order.
pub(crate) fn select_top_k(
    scored: impl Iterator<Item = (f32, u32)>,
    k: usize,
) -> Vec<(f32, u32)> {
    if k == 0 {
        return Vec::new();
    }
    // Min-heap over (score, Reverse(ordinal)): the root is the lowest score,
    // highest ordinal — exactly the entry to evict.
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f32>, Reverse<u32>)>> =
        BinaryHeap::with_capacity(k + 1);
    for (score, ordinal) in scored {
        heap.push(Reverse((OrderedFloat(score), Reverse(ordinal))));
        if heap.len() > k {
            heap.pop();
        }
    }
    let mut out: Vec<(f32, u32)> = heap
        .into_iter()
        .map(|Reverse((OrderedFloat(score), Reverse(ordinal)))| (score, ordinal))
        .collect();
    out.sort_unstable_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentKind;
    use std::collections::HashMap;

    fn doc(title: &str) -> Document {
        Document::new(
            DocumentKind::Recipe,
            title.to_string(),
            format!("Tên món: {title}"),
            HashMap::new(),
        )
    }

    fn axis(dimension: usize, axis: usize, scale: f32) -> Vec<f32> {
        let mut v = vec![0.0; dimension];
        v[axis] = scale;
        v
    }

    // ── Construction and validation ────────────────────────────────────

    #[test]
    fn test_new_index_training_state() {
        assert!(VectorIndex::new(IndexStrategy::Flat, 4).stats().trained);
        assert!(VectorIndex::new(IndexStrategy::Hnsw, 4).stats().trained);
        assert!(!VectorIndex::new(IndexStrategy::Ivf, 4).stats().trained);
    }

    #[test]
    fn test_default_index_shape() {
        let stats = VectorIndex::default().stats();
        assert_eq!(stats.dimension, config::DEFAULT_DIMENSION);
        assert_eq!(stats.strategy, IndexStrategy::Flat);
        assert_eq!(stats.count, 0);
    }

    #[test]
    fn test_add_rejects_batch_mismatch() {
        let mut index = VectorIndex::new(IndexStrategy::Flat, 3);
        let err = index
            .add(&[vec![1.0, 0.0, 0.0]], vec![doc("a"), doc("b")])
            .unwrap_err();
        assert!(matches!(err, Error::BatchMismatch { vectors: 1, documents: 2 }));
        assert_eq!(index.count(), 0);
    }

    #[test]
    fn test_add_rejects_dimension_mismatch() {
        let mut index = VectorIndex::new(IndexStrategy::Flat, 3);
        let err = index.add(&[vec![1.0, 0.0]], vec![doc("a")]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 3, actual: 2 }));
        assert_eq!(index.count(), 0);
    }

    #[test]
    fn test_search_rejects_dimension_mismatch() {
        let index = VectorIndex::new(IndexStrategy::Flat, 3);
        assert!(index.search(&[1.0, 0.0], 5, 0.0).is_err());
    }

    #[test]
    fn test_empty_index_search_is_empty() {
        let index = VectorIndex::new(IndexStrategy::Flat, 3);
        assert!(index.search(&[1.0, 0.0, 0.0], 5, 0.0).unwrap().is_empty());
    }

    // ── Flat search ────────────────────────────────────────────────────

    #[test]
    fn test_flat_search_finds_best_match() {
        let mut index = VectorIndex::new(IndexStrategy::Flat, 3);
        index
            .add(
                &[axis(3, 0, 1.0), axis(3, 1, 1.0), axis(3, 2, 1.0)],
                vec![doc("phở bò"), doc("bún chả"), doc("gỏi cuốn")],
            )
            .unwrap();

        let hits = index.search(&axis(3, 1, 1.0), 2, 0.0).unwrap();
        assert_eq!(hits[0].document.title, "bún chả");
        assert!((hits[0].score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_add_normalizes_input() {
        // Unnormalized input at the same angle must still score ≈ 1.0.
        let mut index = VectorIndex::new(IndexStrategy::Flat, 3);
        index.add(&[axis(3, 0, 25.0)], vec![doc("a")]).unwrap();
        let hits = index.search(&axis(3, 0, 0.3), 1, 0.0).unwrap();
        assert!((hits[0].score - 1.0).abs() < 1e-5);
    }

    // ── IVF training and fallback ──────────────────────────────────────

    #[test]
    fn test_ivf_small_batch_falls_back_to_flat() {
        let mut index = VectorIndex::new(IndexStrategy::Ivf, 3);
        index
            .add(
                &[axis(3, 0, 1.0), axis(3, 1, 1.0)],
                vec![doc("a"), doc("b")],
            )
            .unwrap();

        let stats = index.stats();
        assert!(stats.fell_back);
        assert!(stats.trained);
        assert_eq!(stats.strategy, IndexStrategy::Ivf);

        // Searches still succeed through the exact scan.
        let hits = index.search(&axis(3, 1, 1.0), 1, 0.0).unwrap();
        assert_eq!(hits[0].document.title, "b");
    }

    #[test]
    fn test_ivf_large_batch_trains() {
        let dimension = 4;
        let mut embeddings = Vec::new();
        let mut documents = Vec::new();
        for i in 0..config::IVF_MIN_TRAIN_SAMPLES + 20 {
            // Distinct vectors so every trained centroid owns at least one.
            let mut v = axis(dimension, i % dimension, 1.0);
            v[(i + 1) % dimension] = 0.001 * (i as f32);
            embeddings.push(v);
            documents.push(doc(&format!("doc {i}")));
        }
        let mut index = VectorIndex::new(IndexStrategy::Ivf, dimension);
        index.add(&embeddings, documents).unwrap();

        let stats = index.stats();
        assert!(stats.trained);
        assert!(!stats.fell_back);

        let hits = index.search(&axis(dimension, 2, 1.0), 5, 0.5).unwrap();
        assert!(!hits.is_empty());
        assert!(hits[0].score > 0.9);
    }

    // ── HNSW ───────────────────────────────────────────────────────────

    #[test]
    fn test_hnsw_search_end_to_end() {
        let dimension = 8;
        let mut index = VectorIndex::new(IndexStrategy::Hnsw, dimension);
        let mut embeddings = Vec::new();
        let mut documents = Vec::new();
        for i in 0..50 {
            embeddings.push(axis(dimension, i % dimension, 1.0));
            documents.push(doc(&format!("doc {i}")));
        }
        index.add(&embeddings, documents).unwrap();

        let hits = index.search(&axis(dimension, 3, 1.0), 4, 0.9).unwrap();
        assert!(!hits.is_empty());
        for hit in &hits {
            assert!(hit.score >= 0.9);
            assert_eq!(hit.ordinal as usize % dimension, 3);
        }
    }

    // ── Stats ──────────────────────────────────────────────────────────

    #[test]
    fn test_stats_memory_estimate() {
        let mut index = VectorIndex::new(IndexStrategy::Flat, 384);
        index.add(&[vec![1.0; 384]], vec![doc("a")]).unwrap();
        let stats = index.stats();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.memory_bytes, 384 * 4);
    }

    // ── Top-k helper ───────────────────────────────────────────────────

    #[test]
    fn test_select_top_k_orders_and_breaks_ties() {
        let scored = vec![(0.5, 0), (0.9, 1), (0.5, 2), (0.9, 3), (0.1, 4)];
        let top = select_top_k(scored.into_iter(), 3);
        assert_eq!(top, vec![(0.9, 1), (0.9, 3), (0.5, 0)]);
    }

    #[test]
    fn test_select_top_k_zero() {
        assert!(select_top_k(vec![(0.5, 0)].into_iter(), 0).is_empty());
    }
}
