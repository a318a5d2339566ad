// src/compression/mod.rs
//! Compression codecs for per-file artifacts, package archives, and the manifest
//!
//! Gzip is the mandatory baseline codec; Zstandard is an optional capability
//! that may be disabled at engine construction. Codec parameters are fixed
//! once when the engine is built so that re-running over the same inputs
//! produces byte-identical artifacts.

use std::io::{self, Read, Write};
use thiserror::Error;

/// Compression-related errors
#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("failed to create {format} encoder: {source}")]
    EncoderCreation {
        format: &'static str,
        source: io::Error,
    },

    #[error("failed to compress {format} data: {source}")]
    Compression {
        format: &'static str,
        source: io::Error,
    },

    #[error("failed to decompress {format} data: {source}")]
    Decompression {
        format: &'static str,
        source: io::Error,
    },

    #[error("codec {0} is not available in this engine")]
    UnavailableCodec(&'static str),
}

/// Supported compression codecs, in fixed precedence order
///
/// The derive order defines codec precedence: gzip artifacts are listed and
/// written before zstd artifacts everywhere (manifest paths, sidecar lines).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Codec {
    /// Gzip (mandatory baseline, `.gz`)
    Gzip,
    /// Zstandard (optional capability, `.zstd`)
    Zstd,
}

impl Codec {
    /// Manifest key for this codec
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Zstd => "zstd",
        }
    }

    /// Artifact filename suffix (without the leading dot)
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::Gzip => "gz",
            Self::Zstd => "zstd",
        }
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Fixed codec parameters, chosen once at engine construction
///
/// Never caller-supplied per call: identical inputs must compress to
/// identical bytes across runs on the same codec version.
#[derive(Debug, Clone)]
pub struct CompressionOptions {
    /// Gzip compression level (0-9)
    pub gzip_level: u32,
    /// Zstandard compression level
    pub zstd_level: i32,
    /// Embed a content checksum in zstd frames
    pub zstd_checksum: bool,
    /// Zstd worker threads (0 = single-threaded)
    pub zstd_workers: u32,
    /// Whether the optional zstd codec is enabled at all
    pub enable_zstd: bool,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            gzip_level: 9,
            zstd_level: 10,
            zstd_checksum: true,
            zstd_workers: 4,
            enable_zstd: true,
        }
    }
}

/// Compression engine with a fixed codec set and fixed parameters
///
/// The available codec set is a capability fact established once here;
/// callers query it at startup and never branch on codec availability
/// anywhere else.
pub struct CompressionEngine {
    options: CompressionOptions,
    codecs: Vec<Codec>,
}

impl CompressionEngine {
    /// Create an engine from fixed options
    pub fn new(options: CompressionOptions) -> Self {
        let mut codecs = vec![Codec::Gzip];
        if options.enable_zstd {
            codecs.push(Codec::Zstd);
        }
        Self { options, codecs }
    }

    /// The codecs this engine can produce, in precedence order
    pub fn available_codecs(&self) -> &[Codec] {
        &self.codecs
    }

    /// Compress a byte slice with the given codec
    ///
    /// The same entry point serves single files, package archive streams,
    /// and the serialized manifest; the container format of archive streams
    /// is fixed upstream by the archive builder, not by the codec.
    pub fn compress(&self, codec: Codec, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        if !self.codecs.contains(&codec) {
            return Err(CompressionError::UnavailableCodec(codec.name()));
        }

        match codec {
            Codec::Gzip => {
                let mut encoder = flate2::write::GzEncoder::new(
                    Vec::with_capacity(data.len() / 2),
                    flate2::Compression::new(self.options.gzip_level),
                );
                encoder
                    .write_all(data)
                    .and_then(|()| encoder.finish())
                    .map_err(|e| CompressionError::Compression {
                        format: "gzip",
                        source: e,
                    })
            }
            Codec::Zstd => {
                let mut encoder =
                    zstd::stream::Encoder::new(Vec::new(), self.options.zstd_level).map_err(
                        |e| CompressionError::EncoderCreation {
                            format: "zstd",
                            source: e,
                        },
                    )?;
                encoder.include_checksum(self.options.zstd_checksum).map_err(|e| {
                    CompressionError::EncoderCreation {
                        format: "zstd",
                        source: e,
                    }
                })?;
                if self.options.zstd_workers > 0 {
                    encoder.multithread(self.options.zstd_workers).map_err(|e| {
                        CompressionError::EncoderCreation {
                            format: "zstd",
                            source: e,
                        }
                    })?;
                }
                encoder
                    .write_all(data)
                    .and_then(|()| encoder.finish())
                    .map_err(|e| CompressionError::Compression {
                        format: "zstd",
                        source: e,
                    })
            }
        }
    }

    /// Decompress a byte slice produced by `compress`
    pub fn decompress(&self, codec: Codec, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        match codec {
            Codec::Gzip => {
                let mut decoder = flate2::read::GzDecoder::new(data);
                let mut output = Vec::new();
                decoder
                    .read_to_end(&mut output)
                    .map_err(|e| CompressionError::Decompression {
                        format: "gzip",
                        source: e,
                    })?;
                Ok(output)
            }
            Codec::Zstd => {
                zstd::stream::decode_all(data).map_err(|e| CompressionError::Decompression {
                    format: "zstd",
                    source: e,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_names_and_suffixes() {
        assert_eq!(Codec::Gzip.name(), "gzip");
        assert_eq!(Codec::Gzip.suffix(), "gz");
        assert_eq!(Codec::Zstd.name(), "zstd");
        assert_eq!(Codec::Zstd.suffix(), "zstd");
        assert_eq!(format!("{}", Codec::Gzip), "gzip");
    }

    #[test]
    fn test_codec_precedence_order() {
        // Gzip sorts before zstd; manifest and sidecar ordering rely on this
        assert!(Codec::Gzip < Codec::Zstd);
    }

    #[test]
    fn test_available_codecs_default() {
        let engine = CompressionEngine::new(CompressionOptions::default());
        assert_eq!(engine.available_codecs(), &[Codec::Gzip, Codec::Zstd]);
    }

    #[test]
    fn test_available_codecs_without_zstd() {
        let options = CompressionOptions {
            enable_zstd: false,
            ..Default::default()
        };
        let engine = CompressionEngine::new(options);
        assert_eq!(engine.available_codecs(), &[Codec::Gzip]);
    }

    #[test]
    fn test_gzip_round_trip() {
        let engine = CompressionEngine::new(CompressionOptions::default());
        let data = b"<device><name>TESTCHIP</name></device>".repeat(50);

        let compressed = engine.compress(Codec::Gzip, &data).unwrap();
        assert_ne!(compressed, data);

        let restored = engine.decompress(Codec::Gzip, &compressed).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn test_zstd_round_trip() {
        let engine = CompressionEngine::new(CompressionOptions::default());
        let data = b"<peripheral><name>UART0</name></peripheral>".repeat(50);

        let compressed = engine.compress(Codec::Zstd, &data).unwrap();
        let restored = engine.decompress(Codec::Zstd, &compressed).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn test_compress_empty_input() {
        let engine = CompressionEngine::new(CompressionOptions::default());

        for codec in [Codec::Gzip, Codec::Zstd] {
            let compressed = engine.compress(codec, b"").unwrap();
            let restored = engine.decompress(codec, &compressed).unwrap();
            assert!(restored.is_empty());
        }
    }

    #[test]
    fn test_compress_is_deterministic() {
        let engine = CompressionEngine::new(CompressionOptions::default());
        let data = b"deterministic artifact bytes".repeat(100);

        for codec in [Codec::Gzip, Codec::Zstd] {
            let first = engine.compress(codec, &data).unwrap();
            let second = engine.compress(codec, &data).unwrap();
            assert_eq!(first, second, "{codec} output must be reproducible");
        }
    }

    #[test]
    fn test_unavailable_codec_is_an_error() {
        let options = CompressionOptions {
            enable_zstd: false,
            ..Default::default()
        };
        let engine = CompressionEngine::new(options);

        let result = engine.compress(Codec::Zstd, b"data");
        assert!(matches!(result, Err(CompressionError::UnavailableCodec("zstd"))));
    }
}
