// src/error.rs

//! Crate-level error type aggregating the per-module error enums

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::archive::ArchiveError;
use crate::compression::CompressionError;
use crate::discovery::DiscoveryError;
use crate::hash::HashError;
use crate::manifest::ManifestError;

/// Any error that can abort an indexing run
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Compression(#[from] CompressionError),

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("failed to write artifact {path}: {source}")]
    ArtifactWrite { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;
