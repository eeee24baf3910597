//! Exact brute-force inner-product scan.
//!
//! The Flat strategy and the IVF pre-training fallback both resolve to this
//! scan: every stored vector is compared against the query. Vectors are
//! normalized at insertion and query time, so the inner product is the
//! cosine similarity.

use crate::index::{dot, select_top_k};

/// Scans the whole arena and returns up to `k` ordinals with similarity
/// ≥ `threshold`, descending, ties broken by insertion order.
pub(crate) fn scan(
    arena: &[f32],
    dimension: usize,
    query: &[f32],
    k: usize,
    threshold: f32,
) -> Vec<(f32, u32)> {
    let count = arena.len() / dimension;
    let scored = (0..count).filter_map(|ordinal| {
        let start = ordinal * dimension;
        let similarity = dot(query, &arena[start..start + dimension]);
        (similarity >= threshold).then_some((similarity, ordinal as u32))
    });
    select_top_k(scored, k)
}
