// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use svd_index::{
    CliProgress, CompressionOptions, DEFAULT_SOURCE_URL, IndexerConfig, ProgressReporter,
    SilentProgress,
};

#[derive(Parser)]
#[command(name = "svd-index")]
#[command(author, version, about = "Content-addressed distribution index generator for SVD trees", long_about = None)]
struct Cli {
    /// Data directory containing the SVD source tree
    data_dir: PathBuf,

    /// Filename extension of source documents
    #[arg(long, default_value = "svd")]
    extension: String,

    /// Origin URL recorded in the manifest
    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    url: String,

    /// Disable the optional zstd codec
    #[arg(long)]
    no_zstd: bool,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = IndexerConfig {
        data_dir: cli.data_dir,
        extension: cli.extension,
        source_url: cli.url,
        compression: CompressionOptions {
            enable_zstd: !cli.no_zstd,
            ..Default::default()
        },
    };

    let progress: Box<dyn ProgressReporter> = if cli.quiet {
        Box::new(SilentProgress)
    } else {
        Box::new(CliProgress::new())
    };

    let report = svd_index::run(&config, progress.as_ref())
        .with_context(|| format!("indexing failed for {:?}", config.data_dir))?;

    println!(
        "Indexed {} files and {} packages",
        report.file_count, report.package_count
    );
    println!("  Manifest: {}", report.manifest_path.display());
    println!("  Sidecar:  {}", report.sidecar_path.display());
    println!("  Digest:   {}", report.manifest_digest);

    Ok(())
}
