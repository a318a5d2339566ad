// src/discovery.rs
//! Source document discovery
//!
//! Recursively enumerates SVD documents under a data root and derives each
//! file's dotted identifier (relative path, extension stripped, separators
//! replaced by dots). Output is sorted by relative path so every downstream
//! stage sees a canonical order.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Discovery errors
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("source root {0} is not a readable directory")]
    NotADirectory(PathBuf),

    #[error("failed to traverse source tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to stat {path}: {source}")]
    Metadata { path: PathBuf, source: io::Error },

    #[error("path {0} escapes the source root")]
    OutsideRoot(PathBuf),

    #[error("dotted identifier '{dotted_id}' is ambiguous: '{first}' and '{second}'")]
    DuplicateId {
        dotted_id: String,
        first: String,
        second: String,
    },
}

/// A discovered source document, prior to hashing or compression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Namespace identifier, e.g. `Atmel.SAM.ATSAM3A4C`
    pub dotted_id: String,
    /// Path relative to the data root, with `/` separators, e.g. `Atmel/SAM/ATSAM3A4C.svd`
    pub relative_path: String,
    /// Absolute path on disk
    pub absolute_path: PathBuf,
    /// Size of the original uncompressed document
    pub size_bytes: u64,
}

/// Enumerate all documents with the given extension under `root`
///
/// Returns documents sorted lexicographically by relative path. An empty
/// result is not an error; an unreadable root or a dotted-identifier
/// collision is.
pub fn discover(root: &Path, extension: &str) -> Result<Vec<SourceDocument>, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::NotADirectory(root.to_path_buf()));
    }

    let suffix = format!(".{extension}");
    let mut documents = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !path.extension().is_some_and(|ext| ext == extension) {
            continue;
        }

        let relative = path
            .strip_prefix(root)
            .map_err(|_| DiscoveryError::OutsideRoot(path.to_path_buf()))?;
        let relative_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let stem = relative_path
            .strip_suffix(&suffix)
            .unwrap_or(&relative_path);
        let dotted_id = stem.replace('/', ".");

        let metadata = entry.metadata().map_err(|e| DiscoveryError::Metadata {
            path: path.to_path_buf(),
            source: e.into_io_error().unwrap_or_else(|| io::Error::other("metadata unavailable")),
        })?;

        documents.push(SourceDocument {
            dotted_id,
            relative_path,
            absolute_path: path.to_path_buf(),
            size_bytes: metadata.len(),
        });
    }

    documents.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    // The dotted-id -> path mapping must be injective
    let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
    for doc in &documents {
        if let Some(first) = seen.insert(&doc.dotted_id, &doc.relative_path) {
            return Err(DiscoveryError::DuplicateId {
                dotted_id: doc.dotted_id.clone(),
                first: first.to_string(),
                second: doc.relative_path.clone(),
            });
        }
    }

    debug!("discovered {} .{} documents under {:?}", documents.len(), extension, root);
    Ok(documents)
}
