// src/manifest.rs
//! Index manifest model, canonical serialization, and digest sidecar
//!
//! The manifest is the single `index.json` document describing every source
//! file and every package produced by one run. All maps are `BTreeMap`s and
//! struct fields are declared in alphabetical order, so serialization is
//! byte-stable for a fixed input plus timestamp.

use crate::hash::Digest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Basename of the manifest document in the data root
pub const MANIFEST_BASENAME: &str = "index.json";
/// Basename of the digest sidecar in the data root
pub const SIDECAR_BASENAME: &str = "index.hash";

/// Manifest serialization errors
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to encode manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Origin of the indexed source tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Generation time as float unix-epoch seconds
    pub date: f64,
    /// Where the source tree was retrieved from
    pub url: String,
}

/// Manifest record for one source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// SHA-512 of the original uncompressed bytes
    pub hash: Digest,
    /// Rendition name -> relative path (`plain`, `gzip`, optionally `zstd`)
    pub paths: BTreeMap<String, String>,
    /// Size of the original document in bytes
    pub size: u64,
}

/// One compressed rendition of a package archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveArtifact {
    /// SHA-512 of the compressed archive bytes
    pub hash: Digest,
    /// Artifact filename relative to the data root
    pub name: String,
    /// Compressed size in bytes
    pub size: u64,
}

/// Manifest record for one namespace package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Member dotted id -> member relative path
    pub contents: BTreeMap<String, String>,
    /// Codec name -> archive artifact
    pub files: BTreeMap<String, ArchiveArtifact>,
}

/// The aggregated index document for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub files: BTreeMap<String, FileRecord>,
    pub packages: BTreeMap<String, PackageRecord>,
    pub source: SourceInfo,
}

impl Manifest {
    /// Assemble a manifest from completed file and package records
    pub fn assemble(
        source_url: impl Into<String>,
        generated_at: f64,
        files: BTreeMap<String, FileRecord>,
        packages: BTreeMap<String, PackageRecord>,
    ) -> Self {
        Self {
            files,
            packages,
            source: SourceInfo {
                date: generated_at,
                url: source_url.into(),
            },
        }
    }

    /// Serialize to canonical bytes: sorted keys, 4-space indent
    pub fn serialize(&self) -> Result<Vec<u8>, ManifestError> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        Serialize::serialize(self, &mut serializer)?;
        Ok(out)
    }
}

/// Ordered digest listing for the manifest's own artifacts
///
/// Rendered as newline-terminated `<basename> <hexdigest>` records covering
/// the plain manifest first, then each compressed rendition in codec
/// precedence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestSidecar {
    entries: Vec<(String, Digest)>,
}

impl DigestSidecar {
    /// Append an artifact entry; order of insertion is the output order
    pub fn push(&mut self, filename: impl Into<String>, digest: Digest) {
        self.entries.push((filename.into(), digest));
    }

    /// The recorded `(filename, digest)` pairs in output order
    pub fn entries(&self) -> &[(String, Digest)] {
        &self.entries
    }

    /// Render the sidecar text
    pub fn render(&self) -> String {
        let mut text = String::new();
        for (filename, digest) in &self.entries {
            text.push_str(filename);
            text.push(' ');
            text.push_str(digest.as_str());
            text.push('\n');
        }
        text
    }
}
