//! Durable index storage.
//!
//! One container file holds a magic/version header, a JSON manifest (format
//! version, embedding model, dimensionality, count, build timestamp, chunk
//! records) and the opaque little-endian `f32` vector blob. `save` writes to
//! a temporary sibling and installs it with an atomic rename, so on-disk
//! state is always either the old index fully intact or the new index fully
//! installed.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use medassist_core::{AssistError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::Chunk;
use crate::index::VectorIndex;

const MAGIC: &[u8; 4] = b"MAIX";
const FORMAT_VERSION: u32 = 1;
/// Magic + version + manifest length.
const HEADER_LEN: usize = 4 + 4 + 8;

#[derive(Serialize, Deserialize)]
struct Manifest {
    format_version: u32,
    model: String,
    dimensions: usize,
    count: usize,
    built_at: DateTime<Utc>,
    chunks: Vec<Chunk>,
}

/// Reads and writes the persisted index file.
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    /// Create a store for the given index file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The index file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_error(&self, message: impl std::fmt::Display) -> AssistError {
        AssistError::Storage { path: self.path.display().to_string(), message: message.to_string() }
    }

    fn unavailable(&self, reason: impl std::fmt::Display) -> AssistError {
        AssistError::IndexUnavailable {
            reason: format!("{} ('{}')", reason, self.path.display()),
        }
    }

    /// Serialize and persist an index.
    ///
    /// Writes to `{path}.tmp` and installs it with `rename`, so a crash
    /// mid-write leaves the previous file untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AssistError::Storage`] on any I/O failure.
    pub fn save(&self, index: &VectorIndex) -> Result<()> {
        let manifest = Manifest {
            format_version: FORMAT_VERSION,
            model: index.model().to_string(),
            dimensions: index.dimensions(),
            count: index.len(),
            built_at: index.built_at(),
            chunks: index.chunks().to_vec(),
        };
        let manifest_bytes =
            serde_json::to_vec(&manifest).map_err(|e| self.storage_error(e))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.storage_error(e))?;
            }
        }

        let tmp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&tmp_path).map_err(|e| self.storage_error(e))?;

        let write = |file: &mut fs::File, bytes: &[u8]| {
            file.write_all(bytes).map_err(|e| self.storage_error(e))
        };
        write(&mut file, MAGIC)?;
        write(&mut file, &FORMAT_VERSION.to_le_bytes())?;
        write(&mut file, &(manifest_bytes.len() as u64).to_le_bytes())?;
        write(&mut file, &manifest_bytes)?;
        for value in index.vectors() {
            write(&mut file, &value.to_le_bytes())?;
        }
        file.sync_all().map_err(|e| self.storage_error(e))?;
        drop(file);

        fs::rename(&tmp_path, &self.path).map_err(|e| self.storage_error(e))?;
        info!(path = %self.path.display(), chunk_count = index.len(), "index persisted");
        Ok(())
    }

    /// Load the persisted index.
    ///
    /// # Errors
    ///
    /// Returns [`AssistError::IndexUnavailable`] when the file is missing,
    /// unreadable, or structurally inconsistent (bad magic/version, manifest
    /// that does not parse, blob length that disagrees with
    /// `dimensions × count`). The caller surfaces this as "knowledge base
    /// not initialised", not a crash.
    pub fn load(&self) -> Result<VectorIndex> {
        let bytes = fs::read(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                self.unavailable("index file not found; run ingestion first")
            } else {
                self.unavailable(format!("index file unreadable: {e}"))
            }
        })?;

        if bytes.len() < HEADER_LEN || &bytes[0..4] != MAGIC {
            return Err(self.unavailable("not a MedAssist index file"));
        }
        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != FORMAT_VERSION {
            return Err(self.unavailable(format!(
                "unsupported index format version {version} (expected {FORMAT_VERSION})"
            )));
        }

        let manifest_len = u64::from_le_bytes(
            bytes[8..16].try_into().map_err(|_| self.unavailable("truncated header"))?,
        ) as usize;
        let blob_start = HEADER_LEN
            .checked_add(manifest_len)
            .filter(|end| *end <= bytes.len())
            .ok_or_else(|| self.unavailable("truncated manifest"))?;

        let manifest: Manifest = serde_json::from_slice(&bytes[HEADER_LEN..blob_start])
            .map_err(|e| self.unavailable(format!("manifest does not parse: {e}")))?;

        if manifest.chunks.len() != manifest.count {
            return Err(self.unavailable("manifest chunk count mismatch"));
        }

        let blob = &bytes[blob_start..];
        let expected = manifest
            .count
            .checked_mul(manifest.dimensions)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| self.unavailable("manifest dimensions overflow"))?;
        if blob.len() != expected {
            return Err(self.unavailable(format!(
                "vector blob is {} bytes, expected {expected}",
                blob.len()
            )));
        }

        let vectors: Vec<f32> = blob
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        info!(path = %self.path.display(), chunk_count = manifest.count, "index loaded");
        Ok(VectorIndex::from_parts(
            manifest.model,
            manifest.dimensions,
            manifest.built_at,
            vectors,
            manifest.chunks,
        ))
    }
}
