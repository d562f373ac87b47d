use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::collection::{CollectionHandle, VectorCollection};
use crate::error::StoreError;

const COLLECTION_FILE: &str = "collection.json";
const COLLECTION_TMP: &str = "collection.json.tmp";

/// Filesystem-backed persistence for vector collections.
///
/// Manages the `data/collections/` directory structure:
/// ```text
/// collections/
///   3f9a1c2e8b4d7f60/           ← one directory per source document
///     collection.json           ← manifest + embedded chunks
///     collection.json.tmp       ← in-flight write, renamed into place
/// ```
///
/// Saves write the temp file first and rename it over the final name, so a
/// crash mid-write leaves either the old collection or none, never a
/// half-written one.
#[derive(Debug)]
pub struct VectorStore {
    base_dir: PathBuf,
}

impl VectorStore {
    /// Open a store rooted at `base_dir`, ensuring the directory exists.
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(base_dir.join("collections"))?;
        Ok(Self { base_dir })
    }

    /// Base path for this store.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Collection ID for a document path: the first 16 hex chars of the
    /// SHA-256 of the canonicalized path. Falls back to the path as given
    /// when it cannot be canonicalized (e.g. it does not exist yet).
    pub fn collection_id(document_path: &Path) -> String {
        let canonical =
            fs::canonicalize(document_path).unwrap_or_else(|_| document_path.to_path_buf());
        let digest = Sha256::digest(canonical.to_string_lossy().as_bytes());
        let hex = format!("{digest:x}");
        hex[..16].to_string()
    }

    /// An unready handle for `document_path`. The ingestion pipeline turns
    /// it into a ready one by attaching a built or loaded collection.
    pub fn handle(&self, document_path: &Path) -> CollectionHandle {
        CollectionHandle::new(
            Self::collection_id(document_path),
            document_path.to_path_buf(),
        )
    }

    fn collection_dir(&self, id: &str) -> PathBuf {
        self.base_dir.join("collections").join(id)
    }

    fn collection_file(&self, id: &str) -> PathBuf {
        self.collection_dir(id).join(COLLECTION_FILE)
    }

    /// Load the persisted collection for `id`.
    ///
    /// Returns `Ok(None)` when no collection was ever built. A file that
    /// exists but cannot be decoded yields [`StoreError::Corrupt`]; callers
    /// recover by rebuilding.
    pub fn load(&self, id: &str) -> Result<Option<VectorCollection>, StoreError> {
        let path = self.collection_file(id);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)?;
        let collection = serde_json::from_str(&json).map_err(|e| StoreError::Corrupt {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        debug!(id, "Loaded persisted collection");
        Ok(Some(collection))
    }

    /// Persist `collection` under `id`, atomically replacing any previous one.
    pub fn save(&self, id: &str, collection: &VectorCollection) -> Result<(), StoreError> {
        let dir = self.collection_dir(id);
        fs::create_dir_all(&dir)?;

        let json = serde_json::to_string(collection)?;
        let tmp = dir.join(COLLECTION_TMP);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, self.collection_file(id))?;

        debug!(id, chunks = collection.chunks.len(), "Persisted collection");
        Ok(())
    }

    /// Remove the persisted collection for `id`, if any.
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let dir = self.collection_dir(id);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }
}
