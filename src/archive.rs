// src/archive.rs
//! Deterministic package archive construction
//!
//! Builds a plain (uncompressed) tar stream holding each member's original
//! bytes under its relative path. Headers are normalized (GNU format, fixed
//! mtime, fixed mode) and members are appended in sorted relative-path
//! order, so the archive bytes are reproducible regardless of discovery or
//! completion order. Compression happens downstream, once per codec.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Archive construction errors
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("failed to read archive member {path}: {source}")]
    ReadMember { path: PathBuf, source: io::Error },

    #[error("failed to append '{name}' to archive: {source}")]
    Append { name: String, source: io::Error },

    #[error("failed to finish archive: {0}")]
    Finish(io::Error),
}

/// Build a plain tar archive from `relative path -> source path` members
///
/// A `BTreeMap` input fixes the member order. An empty member set yields a
/// valid empty archive rather than an error.
pub fn build_archive(members: &BTreeMap<String, PathBuf>) -> Result<Vec<u8>, ArchiveError> {
    let mut builder = tar::Builder::new(Vec::new());

    for (name, source) in members {
        let content = fs::read(source).map_err(|e| ArchiveError::ReadMember {
            path: source.clone(),
            source: e,
        })?;

        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_mode(0o644);
        header.set_size(content.len() as u64);
        header.set_mtime(0);
        header.set_cksum();

        builder
            .append_data(&mut header, name, content.as_slice())
            .map_err(|e| ArchiveError::Append {
                name: name.clone(),
                source: e,
            })?;
    }

    builder.into_inner().map_err(ArchiveError::Finish)
}
