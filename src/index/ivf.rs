//! Inverted-file (IVF) index.
//!
//! Vectors are partitioned into clusters by k-means over a training batch;
//! a query probes only the `nprobe` nearest centroid lists instead of the
//! whole arena. Training is a one-time exclusive operation — batches below
//! the training threshold never reach this module (the index falls back to
//! the exact scan instead).

use crate::config;
use crate::index::{dot, select_top_k};
use serde::{Deserialize, Serialize};

/// Trained IVF state: unit-length centroids plus one ordinal list per cluster.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct IvfIndex {
    nlist: usize,
    nprobe: usize,
    /// Centroid arena, `nlist × dimension`, each centroid L2-normalized.
    centroids: Vec<f32>,
    /// Ordinals assigned to each centroid, in insertion order.
    lists: Vec<Vec<u32>>,
}

impl IvfIndex {
    /// Trains centroids on a batch of normalized vectors with Lloyd k-means.
    ///
    /// The cluster count is capped at the sample count so every centroid
    /// starts from a distinct sample. Empty clusters keep their previous
    /// centroid between iterations.
    pub(crate) fn train(samples: &[Vec<f32>], dimension: usize) -> Self {
        let nlist = config::IVF_NLIST.min(samples.len());
        let mut centroids = Vec::with_capacity(nlist * dimension);
        for i in 0..nlist {
            let pick = i * samples.len() / nlist;
            centroids.extend_from_slice(&samples[pick]);
        }

        let mut assignments = vec![0usize; samples.len()];
        for _ in 0..config::IVF_KMEANS_ITERS {
            for (sample, slot) in samples.iter().zip(assignments.iter_mut()) {
                *slot = nearest(&centroids, dimension, sample);
            }

            let mut sums = vec![0.0f32; nlist * dimension];
            let mut counts = vec![0usize; nlist];
            for (sample, &cluster) in samples.iter().zip(assignments.iter()) {
                let base = cluster * dimension;
                for (d, &x) in sample.iter().enumerate() {
                    sums[base + d] += x;
                }
                counts[cluster] += 1;
            }

            for cluster in 0..nlist {
                if counts[cluster] == 0 {
                    continue;
                }
                let base = cluster * dimension;
                let mean = &mut sums[base..base + dimension];
                let norm: f32 = mean.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm > 0.0 {
                    for x in mean.iter_mut() {
                        *x /= norm;
                    }
                }
                centroids[base..base + dimension].copy_from_slice(mean);
            }
        }

        tracing::info!(clusters = nlist, samples = samples.len(), "trained IVF centroids");
        Self {
            nlist,
            nprobe: config::IVF_NPROBE.min(nlist),
            centroids,
            lists: vec![Vec::new(); nlist],
        }
    }

    /// Assigns a new ordinal to its nearest centroid list.
    pub(crate) fn insert(&mut self, ordinal: u32, vector: &[f32], dimension: usize) {
        let cluster = nearest(&self.centroids, dimension, vector);
        self.lists[cluster].push(ordinal);
    }

    /// Probes the `nprobe` nearest centroid lists and ranks their members.
    pub(crate) fn search(
        &self,
        arena: &[f32],
        dimension: usize,
        query: &[f32],
        k: usize,
        threshold: f32,
    ) -> Vec<(f32, u32)> {
        let mut ranked: Vec<(f32, usize)> = (0..self.nlist)
            .map(|c| {
                let base = c * dimension;
                (dot(query, &self.centroids[base..base + dimension]), c)
            })
            .collect();
        ranked.sort_unstable_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let scored = ranked
            .iter()
            .take(self.nprobe)
            .flat_map(|&(_, cluster)| self.lists[cluster].iter().copied())
            .filter_map(|ordinal| {
                let start = ordinal as usize * dimension;
                let similarity = dot(query, &arena[start..start + dimension]);
                (similarity >= threshold).then_some((similarity, ordinal))
            });
        select_top_k(scored, k)
    }

    /// Total ordinals held across all lists. Used by snapshot validation.
    pub(crate) fn assigned_count(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }
}

/// Index of the centroid with the highest inner product against `vector`.
fn nearest(centroids: &[f32], dimension: usize, vector: &[f32]) -> usize {
    let mut best = 0usize;
    let mut best_sim = f32::MIN;
    for (cluster, centroid) in centroids.chunks_exact(dimension).enumerate() {
        let sim = dot(vector, centroid);
        if sim > best_sim {
            best_sim = sim;
            best = cluster;
        }
    }
    best
}
