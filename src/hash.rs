// src/hash.rs

//! SHA-512 content hashing for files, archives, and the manifest itself
//!
//! Every artifact the indexer produces is identified by the SHA-512 digest
//! of its bytes. For source files the digest always covers the original
//! uncompressed bytes, never a compressed rendition.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha512};
use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;
use thiserror::Error;

/// Hashing errors
///
/// Digest computation over in-memory bytes cannot fail; the only failure
/// mode is I/O while reading the bytes to hash.
#[derive(Error, Debug)]
pub enum HashError {
    #[error("failed to read {path} for hashing: {source}")]
    Read { path: PathBuf, source: io::Error },
}

/// A SHA-512 digest as a lowercase hex string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Hex length of a SHA-512 digest (512 bits = 64 bytes = 128 hex chars)
    pub const HEX_LEN: usize = 128;

    /// Get the digest as a hex string
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compute the SHA-512 digest of a byte slice
pub fn digest_bytes(data: &[u8]) -> Digest {
    let mut hasher = Sha512::new();
    hasher.update(data);
    Digest(format!("{:x}", hasher.finalize()))
}

/// Compute the SHA-512 digest of data from a reader
///
/// Streams in 8 KiB chunks to avoid loading the input entirely into memory.
pub fn digest_reader<R: Read>(reader: &mut R) -> io::Result<Digest> {
    let mut hasher = Sha512::new();
    let mut buffer = [0u8; 8192];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(Digest(format!("{:x}", hasher.finalize())))
}

/// Check whether a byte slice hashes to the expected digest
pub fn verify_bytes(data: &[u8], expected: &Digest) -> bool {
    digest_bytes(data) == *expected
}
