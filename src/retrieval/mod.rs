//! Multi-strategy retrieval engine.
//!
//! Four strategies run over a shared document snapshot — exact title match,
//! attribute substring match, category filter, and semantic similarity — and
//! their results are merged in priority order with first-wins deduplication.
//! Strategies whose inputs are unavailable (no semantic context, no category
//! phrase in the query) contribute nothing rather than failing.
//!
//! The document snapshot is an `Arc<Vec<Arc<Document>>>` behind a
//! `parking_lot::RwLock`: readers clone the `Arc` and scan without holding
//! the lock, rebuilds swap the whole snapshot atomically.

mod merge;
mod strategies;

use crate::document::Document;
use crate::index::VectorIndex;
use parking_lot::RwLock;
use std::sync::Arc;

/// Which strategy produced a match. Order here is merge priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    /// Query is a substring of the document title.
    Exact,
    /// Query is a substring of a list-valued attribute (ingredients, tags).
    Attribute,
    /// Query names the document's category.
    Category,
    /// Embedding cosine similarity above the semantic threshold.
    Semantic,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Attribute => "attribute",
            MatchType::Category => "category",
            MatchType::Semantic => "semantic",
        }
    }
}

/// One retrieval result. `score` is cosine similarity for semantic matches
/// and a nominal strategy constant otherwise; ranking across strategies is
/// by priority, not score.
#[derive(Debug, Clone)]
pub struct RankedMatch {
    pub document: Arc<Document>,
    pub score: f32,
    pub match_type: MatchType,
}

/// Where the semantic strategy gets its similarities from.
pub enum SemanticSource<'a> {
    /// Search a vector index (its own metadata supplies the documents).
    Index(&'a VectorIndex),
    /// Score inline embeddings parallel to the engine's document snapshot.
    /// A length mismatch disables the strategy for this query.
    Inline(&'a [Vec<f32>]),
}

/// Query-side input for the semantic strategy.
pub struct SemanticQuery<'a> {
    pub embedding: &'a [f32],
    pub source: SemanticSource<'a>,
}

/// Shared, atomically replaceable document snapshot.
pub struct DocumentStore {
    inner: RwLock<Arc<Vec<Arc<Document>>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Cheap handle to the current snapshot. Scans run lock-free against it;
    /// a concurrent [`replace`](Self::replace) does not affect readers that
    /// already hold a snapshot.
    pub fn snapshot(&self) -> Arc<Vec<Arc<Document>>> {
        Arc::clone(&self.inner.read())
    }

    /// Swaps in a new document set wholesale.
    pub fn replace(&self, documents: Vec<Arc<Document>>) {
        let count = documents.len();
        *self.inner.write() = Arc::new(documents);
        tracing::info!("Document store replaced ({count} documents)");
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs all applicable strategies over the store and merges their results.
pub struct RetrievalEngine {
    store: DocumentStore,
}

impl RetrievalEngine {
    pub fn new() -> Self {
        Self {
            store: DocumentStore::new(),
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Multi-strategy search. Strategies run in priority order — exact,
    /// attribute, category, then semantic when `semantic` is provided —
    /// and the merged union is deduplicated by document id (first strategy
    /// to produce a document keeps it) and capped at
    /// [`crate::config::MERGE_MAX_RESULTS`].
    pub fn search(&self, query: &str, semantic: Option<SemanticQuery<'_>>) -> Vec<RankedMatch> {
        let snapshot = self.store.snapshot();

        let mut groups = Vec::with_capacity(4);
        groups.push(strategies::exact_match(query, &snapshot));
        groups.push(strategies::attribute_match(query, &snapshot));
        groups.push(strategies::category_match(query, &snapshot));
        if let Some(semantic) = semantic {
            groups.push(strategies::semantic_match(&semantic, &snapshot));
        }

        let merged = merge::merge(groups);
        tracing::debug!(
            "Query {:?} matched {} documents across strategies",
            query,
            merged.len()
        );
        merged
    }
}

impl Default for RetrievalEngine {
    fn default() -> Self {
        Self::new()
    }
}
