//! The four retrieval strategies.
//!
//! Each strategy is a pure function from a query and a document snapshot to
//! a (possibly empty) list of [`RankedMatch`]es. Text strategies compare
//! lowercased strings; the semantic strategy defers to the vector index or
//! scores inline embeddings directly.

use crate::config;
use crate::document::{attr, AttrValue, Document};
use crate::index::{dot, l2_normalize, select_top_k};
use crate::retrieval::{MatchType, RankedMatch, SemanticQuery, SemanticSource};
use std::sync::Arc;

/// Vietnamese category phrases mapped to stored category codes, checked in
/// declaration order. The first phrase found in the query wins.
const CATEGORY_PHRASES: &[(&str, &str)] = &[
    ("món chính", "monchinh"),
    ("món phụ", "monphu"),
    ("tráng miệng", "trangmieng"),
    ("đồ uống", "douong"),
    ("ăn vặt", "anvat"),
];

/// Case-insensitive title match in either direction: the query names part
/// of the title, or the full title appears inside a longer question
/// ("cách làm phở bò" hits a recipe titled "Phở Bò").
pub(crate) fn exact_match(query: &str, documents: &[Arc<Document>]) -> Vec<RankedMatch> {
    let query = query.to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    documents
        .iter()
        .filter(|doc| {
            let title = doc.title.to_lowercase();
            !title.is_empty() && (title.contains(&query) || query.contains(&title))
        })
        .map(|doc| RankedMatch {
            document: Arc::clone(doc),
            score: config::EXACT_MATCH_SCORE,
            match_type: MatchType::Exact,
        })
        .collect()
}

/// Substring match over a document's list-valued attributes, joined with
/// spaces (ingredient lines, instruction steps, tags).
pub(crate) fn attribute_match(query: &str, documents: &[Arc<Document>]) -> Vec<RankedMatch> {
    let query = query.to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    documents
        .iter()
        .filter(|doc| {
            let joined: String = doc
                .attributes
                .values()
                .filter_map(|value| match value {
                    AttrValue::List(items) => Some(items.join(" ")),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            !joined.is_empty() && joined.contains(&query)
        })
        .map(|doc| RankedMatch {
            document: Arc::clone(doc),
            score: config::NON_SEMANTIC_MATCH_SCORE,
            match_type: MatchType::Attribute,
        })
        .collect()
}

/// Hard category filter: if the query names a category phrase, return every
/// document stored under that category code; otherwise nothing.
pub(crate) fn category_match(query: &str, documents: &[Arc<Document>]) -> Vec<RankedMatch> {
    let query = query.to_lowercase();
    let Some(code) = CATEGORY_PHRASES
        .iter()
        .find(|(phrase, _)| query.contains(phrase))
        .map(|&(_, code)| code)
    else {
        return Vec::new();
    };

    documents
        .iter()
        .filter(|doc| doc.str_attr(attr::CATEGORY) == Some(code))
        .map(|doc| RankedMatch {
            document: Arc::clone(doc),
            score: config::NON_SEMANTIC_MATCH_SCORE,
            match_type: MatchType::Category,
        })
        .collect()
}

/// Semantic similarity above [`config::SEMANTIC_SIMILARITY_THRESHOLD`],
/// best first. Index-backed queries report the index's own documents;
/// inline embeddings score against the snapshot and are skipped entirely on
/// a length mismatch.
pub(crate) fn semantic_match(
    semantic: &SemanticQuery<'_>,
    documents: &[Arc<Document>],
) -> Vec<RankedMatch> {
    match semantic.source {
        SemanticSource::Index(index) => {
            let hits = match index.search(
                semantic.embedding,
                config::MERGE_MAX_RESULTS,
                config::SEMANTIC_SIMILARITY_THRESHOLD,
            ) {
                Ok(hits) => hits,
                Err(e) => {
                    tracing::warn!("Semantic strategy skipped: {e}");
                    return Vec::new();
                }
            };
            hits.into_iter()
                .map(|hit| RankedMatch {
                    document: hit.document,
                    score: hit.score,
                    match_type: MatchType::Semantic,
                })
                .collect()
        }
        SemanticSource::Inline(embeddings) => {
            if embeddings.len() != documents.len() {
                tracing::warn!(
                    "Semantic strategy skipped: {} embeddings for {} documents",
                    embeddings.len(),
                    documents.len()
                );
                return Vec::new();
            }
            let mut query = semantic.embedding.to_vec();
            l2_normalize(&mut query);

            let scored = embeddings.iter().enumerate().filter_map(|(i, embedding)| {
                let mut embedding = embedding.clone();
                l2_normalize(&mut embedding);
                let similarity = dot(&query, &embedding);
                (similarity >= config::SEMANTIC_SIMILARITY_THRESHOLD)
                    .then_some((similarity, i as u32))
            });
            select_top_k(scored, config::MERGE_MAX_RESULTS)
                .into_iter()
                .map(|(score, ordinal)| RankedMatch {
                    document: Arc::clone(&documents[ordinal as usize]),
                    score,
                    match_type: MatchType::Semantic,
                })
                .collect()
        }
    }
}
