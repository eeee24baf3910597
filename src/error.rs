//! Crate error type.
//!
//! Recoverable conditions get their own variants so callers can branch on
//! them: `PersistenceMissing` signals "rebuild from source data" while
//! `PersistenceCorrupt` means the snapshot pair must not be served. Empty
//! inputs are never errors anywhere in the crate — search returns empty
//! results and confidence factors return documented neutral values.

use thiserror::Error;

/// Errors produced by the index, persistence, and pipeline layers.
#[derive(Debug, Error)]
pub enum Error {
    /// A vector's length violates the index dimension contract.
    /// Fatal to that insertion or query, not to the index.
    #[error("embedding dimension {actual} != expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// An `add` batch where embeddings and metadata differ in length.
    #[error("batch mismatch: {vectors} embeddings vs {documents} documents")]
    BatchMismatch { vectors: usize, documents: usize },

    /// Snapshot files are absent. Recoverable — rebuild from source data.
    #[error("index snapshot not found")]
    PersistenceMissing,

    /// Snapshot pair is inconsistent or fails its checksum. The index must
    /// not be served from it; a rebuild is required.
    #[error("index snapshot corrupt: {0}")]
    PersistenceCorrupt(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// The external embedding provider failed.
    #[error("embedding provider error: {0}")]
    Embedding(String),

    /// The external answer generator failed. The pipeline degrades to the
    /// caller-supplied fallback text rather than propagating this.
    #[error("answer generator error: {0}")]
    Generation(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
