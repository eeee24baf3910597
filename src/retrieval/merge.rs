//! Priority-ordered union of strategy results.

use crate::config;
use crate::retrieval::RankedMatch;
use std::collections::HashSet;

/// Concatenates strategy groups in the order given, drops duplicate
/// documents (the earliest strategy keeps its match type and score), and
/// caps the union at [`config::MERGE_MAX_RESULTS`].
pub(crate) fn merge(groups: Vec<Vec<RankedMatch>>) -> Vec<RankedMatch> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for matched in groups.into_iter().flatten() {
        if seen.insert(matched.document.id) {
            merged.push(matched);
            if merged.len() == config::MERGE_MAX_RESULTS {
                break;
            }
        }
    }
    merged
}
