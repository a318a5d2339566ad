// src/progress.rs

//! Progress reporting for the indexing pipeline
//!
//! The pipeline reports completion of each file, each package, and the final
//! manifest through an injected `ProgressReporter`, decoupling user-visible
//! progress from the pipeline logic. Implementations cover interactive use
//! (`CliProgress`), log-based environments (`LogProgress`), and quiet or
//! scripted runs (`SilentProgress`).

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::info;

/// Observer for pipeline completion events
///
/// Implementations must be thread-safe: file and package events arrive from
/// parallel workers.
pub trait ProgressReporter: Send + Sync {
    /// A source file has been hashed and compressed with every codec
    fn file_processed(&self, dotted_id: &str);

    /// A package archive has been built, compressed, and hashed
    fn package_processed(&self, dotted_id: &str);

    /// The manifest and sidecar have been published
    fn manifest_written(&self, path: &Path);
}

/// No-op reporter for quiet or scripted runs
#[derive(Debug, Default)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn file_processed(&self, _dotted_id: &str) {}
    fn package_processed(&self, _dotted_id: &str) {}
    fn manifest_written(&self, _path: &Path) {}
}

/// Reporter that logs each event to tracing at info level
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn file_processed(&self, dotted_id: &str) {
        info!("processed file: {}", dotted_id);
    }

    fn package_processed(&self, dotted_id: &str) {
        info!("processed package: {}", dotted_id);
    }

    fn manifest_written(&self, path: &Path) {
        info!("wrote manifest: {:?}", path);
    }
}

/// Interactive spinner showing the most recently completed item
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::default_spinner());
        Self { bar }
    }
}

impl Default for CliProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for CliProgress {
    fn file_processed(&self, dotted_id: &str) {
        self.bar.inc(1);
        self.bar.set_message(format!("file {dotted_id}"));
    }

    fn package_processed(&self, dotted_id: &str) {
        self.bar.inc(1);
        self.bar.set_message(format!("package {dotted_id}"));
    }

    fn manifest_written(&self, path: &Path) {
        self.bar
            .finish_with_message(format!("manifest written to {}", path.display()));
    }
}
