// src/pipeline.rs
//! Indexing pipeline orchestration
//!
//! Drives the full run: discover sources, resolve the package hierarchy,
//! process files and packages in parallel, then assemble, serialize, hash,
//! and compress the manifest and publish it together with the digest
//! sidecar. Fail-fast: any per-file or per-package error aborts the run
//! before the manifest is assembled, so no partial manifest is ever written.
//!
//! Manifest artifacts are staged as temp files in the data root and renamed
//! into place only once all of them are ready; a failed run leaves any
//! previously published manifest untouched.

use crate::archive::build_archive;
use crate::compression::{CompressionEngine, CompressionOptions};
use crate::discovery::{self, SourceDocument};
use crate::error::{Error, Result};
use crate::hash::{Digest, HashError, digest_bytes};
use crate::hierarchy::{PackageMembers, resolve_packages};
use crate::manifest::{
    ArchiveArtifact, DigestSidecar, FileRecord, MANIFEST_BASENAME, Manifest, PackageRecord,
    SIDECAR_BASENAME,
};
use crate::progress::ProgressReporter;
use chrono::Utc;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Upstream origin of the SVD data tree, recorded in the manifest
pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/cmsis-svd/cmsis-svd-data/refs/heads/main/data";

/// Configuration for one indexing run
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Root of the source tree; artifacts are written next to the sources
    pub data_dir: PathBuf,
    /// Filename extension of source documents (without the dot)
    pub extension: String,
    /// Origin URL recorded in the manifest's `source` section
    pub source_url: String,
    /// Fixed codec parameters for the whole run
    pub compression: CompressionOptions,
}

impl IndexerConfig {
    /// Configuration with default extension, origin, and codec parameters
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            extension: "svd".to_string(),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            compression: CompressionOptions::default(),
        }
    }
}

/// Summary of a successful run
#[derive(Debug)]
pub struct RunReport {
    /// Number of source files indexed
    pub file_count: usize,
    /// Number of packages produced
    pub package_count: usize,
    /// Path of the published manifest
    pub manifest_path: PathBuf,
    /// Path of the published digest sidecar
    pub sidecar_path: PathBuf,
    /// SHA-512 of the plain manifest bytes
    pub manifest_digest: Digest,
}

/// Run the full indexing pipeline
pub fn run(config: &IndexerConfig, progress: &dyn ProgressReporter) -> Result<RunReport> {
    let engine = CompressionEngine::new(config.compression.clone());
    info!(
        "indexing {:?} (codecs: {:?})",
        config.data_dir,
        engine.available_codecs()
    );

    // Discover. Package membership derives from the complete id set, so
    // nothing downstream starts until enumeration has finished.
    let documents = discovery::discover(&config.data_dir, &config.extension)?;

    // Resolve the package hierarchy.
    let packages = resolve_packages(
        documents
            .iter()
            .map(|d| (d.dotted_id.as_str(), d.relative_path.as_str())),
    );

    // Process files in parallel. Collecting into Result short-circuits on
    // the first failure, which is the abort barrier: the manifest is only
    // assembled from a fully successful set.
    let file_records: Vec<(String, FileRecord)> = documents
        .par_iter()
        .map(|doc| {
            let record = process_file(doc, &engine, &config.data_dir)?;
            progress.file_processed(&doc.dotted_id);
            Ok((doc.dotted_id.clone(), record))
        })
        .collect::<Result<Vec<_>>>()?;

    // Process packages in parallel. Archives read the original bytes from
    // disk, independent of the per-file compression results.
    let package_records: Vec<(String, PackageRecord)> = packages
        .par_iter()
        .map(|(package_id, members)| {
            let record = process_package(package_id, members, &engine, &config.data_dir)?;
            progress.package_processed(package_id);
            Ok((package_id.clone(), record))
        })
        .collect::<Result<Vec<_>>>()?;

    // Merge keyed results into sorted maps; completion order is irrelevant.
    let files: BTreeMap<String, FileRecord> = file_records.into_iter().collect();
    let package_map: BTreeMap<String, PackageRecord> = package_records.into_iter().collect();
    let file_count = files.len();
    let package_count = package_map.len();

    // Assemble and serialize the manifest.
    let generated_at = Utc::now().timestamp_micros() as f64 / 1_000_000.0;
    let manifest = Manifest::assemble(&config.source_url, generated_at, files, package_map);
    let manifest_bytes = manifest.serialize()?;
    let manifest_digest = digest_bytes(&manifest_bytes);

    // Hash and compress the manifest itself, building the sidecar as we go:
    // plain rendition first, then each codec in precedence order.
    let mut sidecar = DigestSidecar::default();
    sidecar.push(MANIFEST_BASENAME, manifest_digest.clone());

    let mut artifacts: Vec<(String, Vec<u8>)> =
        vec![(MANIFEST_BASENAME.to_string(), manifest_bytes)];
    for codec in engine.available_codecs() {
        let compressed = engine.compress(*codec, &artifacts[0].1)?;
        let name = format!("{MANIFEST_BASENAME}.{}", codec.suffix());
        sidecar.push(&name, digest_bytes(&compressed));
        artifacts.push((name, compressed));
    }
    artifacts.push((SIDECAR_BASENAME.to_string(), sidecar.render().into_bytes()));

    publish_artifacts(&config.data_dir, &artifacts)?;

    let manifest_path = config.data_dir.join(MANIFEST_BASENAME);
    let sidecar_path = config.data_dir.join(SIDECAR_BASENAME);
    progress.manifest_written(&manifest_path);
    info!(
        "indexed {} files and {} packages into {:?}",
        file_count, package_count, manifest_path
    );

    Ok(RunReport {
        file_count,
        package_count,
        manifest_path,
        sidecar_path,
        manifest_digest,
    })
}

/// Hash a source document and write one compressed artifact per codec
fn process_file(
    doc: &SourceDocument,
    engine: &CompressionEngine,
    data_dir: &Path,
) -> Result<FileRecord> {
    let bytes = fs::read(&doc.absolute_path).map_err(|e| HashError::Read {
        path: doc.absolute_path.clone(),
        source: e,
    })?;

    // Hash covers the original bytes, never a compressed rendition.
    let hash = digest_bytes(&bytes);
    debug!("hashed file: {}", doc.dotted_id);

    let mut paths = BTreeMap::new();
    paths.insert("plain".to_string(), doc.relative_path.clone());

    for codec in engine.available_codecs() {
        let compressed = engine.compress(*codec, &bytes)?;
        let artifact_rel = format!("{}.{}", doc.relative_path, codec.suffix());
        write_artifact(&data_dir.join(&artifact_rel), &compressed)?;
        debug!("compressed file with {}: {}", codec, doc.dotted_id);
        paths.insert(codec.name().to_string(), artifact_rel);
    }

    Ok(FileRecord {
        hash,
        paths,
        size: doc.size_bytes,
    })
}

/// Build a package's archive and write one compressed rendition per codec
fn process_package(
    package_id: &str,
    members: &PackageMembers,
    engine: &CompressionEngine,
    data_dir: &Path,
) -> Result<PackageRecord> {
    // In-archive names are the members' relative paths, sorted.
    let archive_members: BTreeMap<String, PathBuf> = members
        .values()
        .map(|rel| (rel.clone(), data_dir.join(rel)))
        .collect();
    let tar_bytes = build_archive(&archive_members)?;

    let mut files = BTreeMap::new();
    for codec in engine.available_codecs() {
        let compressed = engine.compress(*codec, &tar_bytes)?;
        let name = format!("{package_id}.tar.{}", codec.suffix());
        write_artifact(&data_dir.join(&name), &compressed)?;
        debug!("compressed package with {}: {}", codec, package_id);

        files.insert(
            codec.name().to_string(),
            ArchiveArtifact {
                hash: digest_bytes(&compressed),
                name,
                size: compressed.len() as u64,
            },
        );
    }

    Ok(PackageRecord {
        contents: members.clone(),
        files,
    })
}

fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|e| Error::ArtifactWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Stage every manifest artifact as a temp file, then rename all into place
///
/// The rename pass starts only after every artifact has been fully staged,
/// so a failure part-way leaves a previous manifest generation intact.
fn publish_artifacts(data_dir: &Path, artifacts: &[(String, Vec<u8>)]) -> Result<()> {
    let mut staged: Vec<(PathBuf, NamedTempFile)> = Vec::with_capacity(artifacts.len());

    for (name, bytes) in artifacts {
        let target = data_dir.join(name);
        let mut temp = NamedTempFile::new_in(data_dir).map_err(|e| Error::ArtifactWrite {
            path: target.clone(),
            source: e,
        })?;
        temp.write_all(bytes).map_err(|e| Error::ArtifactWrite {
            path: target.clone(),
            source: e,
        })?;
        staged.push((target, temp));
    }

    for (target, temp) in staged {
        temp.persist(&target).map_err(|e| Error::ArtifactWrite {
            path: target.clone(),
            source: e.error,
        })?;
    }

    Ok(())
}
