//! Disk persistence for index snapshots.
//!
//! A snapshot is a pair of bincode files in one directory: `index.cbx`
//! (dimension, backend state, and the vector arena) and `documents.cbx`
//! (the metadata table). Writes are atomic via temp-file + rename, and each
//! file carries a CRC32 footer: `[payload][magic "CBX1"][u32 CRC32 BE]`.
//!
//! A missing pair is [`Error::PersistenceMissing`] — the caller rebuilds
//! from source data. A failed checksum, a decode failure, or a pair whose
//! halves disagree is [`Error::PersistenceCorrupt`] and must not be served.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::index::{Backend, IndexStrategy, VectorIndex};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Magic bytes preceding the CRC32 footer.
const SNAPSHOT_MAGIC: &[u8; 4] = b"CBX1";

const INDEX_FILE: &str = "index.cbx";
const DOCUMENTS_FILE: &str = "documents.cbx";

/// Serialized form of the index half of a snapshot.
#[derive(Serialize)]
struct IndexFileRef<'a> {
    dimension: usize,
    strategy: IndexStrategy,
    trained: bool,
    fell_back: bool,
    vectors: &'a Vec<f32>,
    backend: &'a Backend,
}

#[derive(Deserialize)]
struct IndexFileData {
    dimension: usize,
    strategy: IndexStrategy,
    trained: bool,
    fell_back: bool,
    vectors: Vec<f32>,
    backend: Backend,
}

/// Writes the snapshot pair for `index` into `dir`, creating it if needed.
pub(crate) fn save(index: &VectorIndex, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;

    let index_bytes = bincode::serialize(&IndexFileRef {
        dimension: index.dimension,
        strategy: index.strategy,
        trained: index.trained,
        fell_back: index.fell_back,
        vectors: &index.vectors,
        backend: &index.backend,
    })
    .map_err(|e| Error::Serialization(e.to_string()))?;
    let document_bytes =
        bincode::serialize(&index.metadata).map_err(|e| Error::Serialization(e.to_string()))?;

    write_checksummed(&dir.join(INDEX_FILE), &index_bytes)?;
    write_checksummed(&dir.join(DOCUMENTS_FILE), &document_bytes)?;

    tracing::info!(
        "Saved {} index snapshot to {:?} ({} documents, {} vector bytes)",
        index.strategy.as_str(),
        dir,
        index.metadata.len(),
        index_bytes.len()
    );
    Ok(())
}

/// Restores an index from the snapshot pair in `dir`, verifying checksums
/// and cross-file consistency.
pub(crate) fn load(dir: &Path) -> Result<VectorIndex> {
    let index_bytes = read_checksummed(&dir.join(INDEX_FILE))?;
    let document_bytes = read_checksummed(&dir.join(DOCUMENTS_FILE))?;

    let data: IndexFileData = bincode::deserialize(&index_bytes)
        .map_err(|e| Error::PersistenceCorrupt(format!("index decode failed: {e}")))?;
    let metadata: Vec<Arc<Document>> = bincode::deserialize(&document_bytes)
        .map_err(|e| Error::PersistenceCorrupt(format!("documents decode failed: {e}")))?;

    validate(&data, &metadata)?;

    tracing::info!(
        "Loaded {} index snapshot from {:?} ({} documents)",
        data.strategy.as_str(),
        dir,
        metadata.len()
    );
    Ok(VectorIndex {
        dimension: data.dimension,
        strategy: data.strategy,
        trained: data.trained,
        fell_back: data.fell_back,
        vectors: data.vectors,
        metadata,
        backend: data.backend,
    })
}

/// Checks the arena/metadata/backend size invariants of a loaded pair.
fn validate(data: &IndexFileData, metadata: &[Arc<Document>]) -> Result<()> {
    if data.dimension == 0 {
        return Err(Error::PersistenceCorrupt("zero dimension".into()));
    }
    if data.vectors.len() != metadata.len() * data.dimension {
        return Err(Error::PersistenceCorrupt(format!(
            "arena holds {} floats but {} documents × {} dims expected",
            data.vectors.len(),
            metadata.len(),
            data.dimension
        )));
    }
    let backend_count = match &data.backend {
        Backend::Flat => metadata.len(),
        Backend::Ivf(ivf) => ivf.assigned_count(),
        Backend::Hnsw(graph) => graph.node_count(),
    };
    if backend_count != metadata.len() {
        return Err(Error::PersistenceCorrupt(format!(
            "backend tracks {} vectors but metadata holds {}",
            backend_count,
            metadata.len()
        )));
    }
    Ok(())
}

/// Atomic checksummed write: temp file in the same directory, then rename.
fn write_checksummed(path: &Path, payload: &[u8]) -> Result<()> {
    let crc = crc32fast::hash(payload);
    let mut output = Vec::with_capacity(payload.len() + 8);
    output.extend_from_slice(payload);
    output.extend_from_slice(SNAPSHOT_MAGIC);
    output.extend_from_slice(&crc.to_be_bytes());

    let tmp_path = path.with_extension("cbx.tmp");
    fs::write(&tmp_path, &output)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Reads a checksummed file back, distinguishing "absent" from "damaged".
fn read_checksummed(path: &Path) -> Result<Vec<u8>> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::PersistenceMissing)
        }
        Err(e) => return Err(Error::Io(e)),
    };

    if raw.len() < 8 || &raw[raw.len() - 8..raw.len() - 4] != SNAPSHOT_MAGIC {
        return Err(Error::PersistenceCorrupt(format!(
            "missing snapshot footer in {path:?}"
        )));
    }
    let payload = &raw[..raw.len() - 8];
    let stored = u32::from_be_bytes([
        raw[raw.len() - 4],
        raw[raw.len() - 3],
        raw[raw.len() - 2],
        raw[raw.len() - 1],
    ]);
    let computed = crc32fast::hash(payload);
    if stored != computed {
        return Err(Error::PersistenceCorrupt(format!(
            "CRC32 mismatch in {path:?}: stored {stored:#010x}, computed {computed:#010x}"
        )));
    }
    Ok(payload.to_vec())
}
