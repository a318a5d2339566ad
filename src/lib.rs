// src/lib.rs

//! SVD distribution index generator
//!
//! Builds a content-addressed manifest for a tree of SVD register-description
//! documents: per-file compressed artifacts and SHA-512 hashes, per-namespace
//! tar packages derived from dotted identifiers, a deterministic `index.json`
//! manifest, and an `index.hash` digest sidecar.
//!
//! # Architecture
//!
//! - Documents are opaque byte blobs identified by dotted namespace ids
//! - Every artifact carries a SHA-512 content hash of its exact bytes
//! - Codec parameters are fixed at startup so runs are reproducible
//! - Serialization uses sorted keys; re-runs differ only in the timestamp
//! - Fail-fast: no partial manifest is ever published

pub mod archive;
pub mod compression;
pub mod discovery;
mod error;
pub mod hash;
pub mod hierarchy;
pub mod manifest;
pub mod pipeline;
pub mod progress;

pub use archive::build_archive;
pub use compression::{Codec, CompressionEngine, CompressionError, CompressionOptions};
pub use discovery::{DiscoveryError, SourceDocument, discover};
pub use error::{Error, Result};
pub use hash::{Digest, HashError, digest_bytes, digest_reader};
pub use hierarchy::{ancestor_packages, resolve_packages};
pub use manifest::{
    ArchiveArtifact, DigestSidecar, FileRecord, MANIFEST_BASENAME, Manifest, ManifestError,
    PackageRecord, SIDECAR_BASENAME, SourceInfo,
};
pub use pipeline::{DEFAULT_SOURCE_URL, IndexerConfig, RunReport, run};
pub use progress::{CliProgress, LogProgress, ProgressReporter, SilentProgress};
