//! # cookbase
//!
//! An embeddable knowledge-base retrieval engine for a Vietnamese cooking
//! assistant, combining vector similarity search with multi-strategy
//! retrieval and multi-factor confidence scoring.
//!
//! ## Features
//!
//! - **Vector index** with three interchangeable strategies: exact Flat scan,
//!   IVF inverted lists (k-means trained), and an HNSW proximity graph
//! - **Multi-strategy retrieval** merging exact title, attribute, category,
//!   and semantic matches with priority-ordered deduplication
//! - **Confidence scoring** from seven weighted factors instead of a single
//!   cosine similarity, with a five-level ladder and Vietnamese explanations
//! - **Snapshot persistence** via bincode with CRC32 footers and atomic writes
//! - **Ask pipeline** wiring retrieval, prompt assembly, and graceful
//!   degradation around caller-supplied embedding and generation boundaries
//!
//! ## Architecture
//!
//! ```text
//! Pipeline::ask → RetrievalEngine → { Exact, Attribute, Category, Semantic }
//!                                  → merge (priority, dedup, cap)
//!               → AnswerGenerator (fallback on error)
//!               → ConfidenceScorer (7 factors → level + explanation)
//! Index: arena (f32, L2-normalized) + { Flat | IVF | HNSW } backend
//! Persistence: bincode snapshots + CRC32 footer, temp-file + rename
//! ```
//!
//! This is a pure in-process library with zero async dependencies — the
//! embedding model and the hosted generator stay outside, behind the
//! [`pipeline::EmbeddingProvider`] and [`pipeline::AnswerGenerator`] traits.

/// Multi-factor confidence scoring: seven weighted factors, level ladder, and explanations.
pub mod confidence;
/// Global configuration constants: index parameters, thresholds, and scoring weights.
pub mod config;
/// Core document types: `Document`, `DocumentKind`, and attribute values.
pub mod document;
/// Crate error enum and `Result` alias.
pub mod error;
/// Raw JSON record → `Document` mapping with per-kind searchable text.
pub mod ingest;
/// Vector similarity index: Flat, IVF, and HNSW backends plus disk snapshots.
pub mod index;
/// End-to-end ask pipeline: retrieval, prompt assembly, generation fallback, scoring.
pub mod pipeline;
/// Multi-strategy retrieval: exact, attribute, category, and semantic matching.
pub mod retrieval;

pub use confidence::{ConfidenceLevel, ConfidenceScore, ConfidenceScorer};
pub use document::{Document, DocumentKind};
pub use error::{Error, Result};
pub use index::{IndexStrategy, SearchHit, VectorIndex};
pub use retrieval::{MatchType, RankedMatch, RetrievalEngine};
