// tests/pipeline_test.rs

//! End-to-end tests for the indexing pipeline
//!
//! Exercise the full run over small fixture trees and verify the published
//! artifacts: manifest schema, package archives, digest sidecar, round-trip
//! laws, and determinism across re-runs.

use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::Path;
use svd_index::{
    Codec, CompressionEngine, CompressionOptions, IndexerConfig, SilentProgress, digest_bytes,
};

const FOO_CONTENT: &str = "<device><name>FOO</name></device>";
const BAR_CONTENT: &str = "<device><name>BAR</name></device>";
const STANDALONE_CONTENT: &str = "<device><name>STANDALONE</name></device>";

fn write_fixture(root: &Path) {
    fs::create_dir_all(root.join("core")).unwrap();
    fs::write(root.join("core/foo.svd"), FOO_CONTENT).unwrap();
    fs::write(root.join("core/bar.svd"), BAR_CONTENT).unwrap();
    fs::write(root.join("standalone.svd"), STANDALONE_CONTENT).unwrap();
}

fn run_indexer(root: &Path) -> svd_index::RunReport {
    let config = IndexerConfig::new(root);
    svd_index::run(&config, &SilentProgress).unwrap()
}

fn load_manifest(root: &Path) -> Value {
    serde_json::from_slice(&fs::read(root.join("index.json")).unwrap()).unwrap()
}

#[test]
fn test_manifest_lists_files_and_packages() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let report = run_indexer(dir.path());
    assert_eq!(report.file_count, 3);
    assert_eq!(report.package_count, 1);

    let manifest = load_manifest(dir.path());

    let files = manifest["files"].as_object().unwrap();
    assert_eq!(files.len(), 3);
    for id in ["core.bar", "core.foo", "standalone"] {
        let record = &files[id];
        assert_eq!(record["hash"].as_str().unwrap().len(), 128);
        assert!(record["paths"]["plain"].is_string());
        assert!(record["paths"]["gzip"].is_string());
    }
    assert_eq!(files["core.foo"]["paths"]["plain"], "core/foo.svd");
    assert_eq!(files["core.foo"]["paths"]["gzip"], "core/foo.svd.gz");
    assert_eq!(
        files["core.foo"]["size"].as_u64().unwrap(),
        FOO_CONTENT.len() as u64
    );
    assert_eq!(
        files["core.foo"]["hash"],
        digest_bytes(FOO_CONTENT.as_bytes()).as_str()
    );

    // The only package is `core`; the single-segment id yields none.
    let packages = manifest["packages"].as_object().unwrap();
    assert_eq!(packages.len(), 1);
    let core = &packages["core"];
    assert_eq!(core["contents"]["core.foo"], "core/foo.svd");
    assert_eq!(core["contents"]["core.bar"], "core/bar.svd");
    assert_eq!(core["files"]["gzip"]["name"], "core.tar.gz");
}

#[test]
fn test_artifacts_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    run_indexer(dir.path());

    for artifact in [
        "core/foo.svd.gz",
        "core/foo.svd.zstd",
        "core/bar.svd.gz",
        "standalone.svd.gz",
        "core.tar.gz",
        "core.tar.zstd",
        "index.json",
        "index.json.gz",
        "index.json.zstd",
        "index.hash",
    ] {
        assert!(dir.path().join(artifact).exists(), "missing {artifact}");
    }
}

#[test]
fn test_compressed_file_artifacts_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    run_indexer(dir.path());

    let engine = CompressionEngine::new(CompressionOptions::default());

    let gz = fs::read(dir.path().join("core/foo.svd.gz")).unwrap();
    assert_eq!(
        engine.decompress(Codec::Gzip, &gz).unwrap(),
        FOO_CONTENT.as_bytes()
    );

    let zstd = fs::read(dir.path().join("core/foo.svd.zstd")).unwrap();
    assert_eq!(
        engine.decompress(Codec::Zstd, &zstd).unwrap(),
        FOO_CONTENT.as_bytes()
    );
}

#[test]
fn test_package_archive_holds_original_members() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    run_indexer(dir.path());

    let engine = CompressionEngine::new(CompressionOptions::default());
    let compressed = fs::read(dir.path().join("core.tar.gz")).unwrap();
    let tar_bytes = engine.decompress(Codec::Gzip, &compressed).unwrap();

    let mut reader = tar::Archive::new(tar_bytes.as_slice());
    let mut entries = Vec::new();
    for entry in reader.entries().unwrap() {
        let mut entry = entry.unwrap();
        let name = entry.path().unwrap().to_string_lossy().to_string();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        entries.push((name, content));
    }

    // Members appear in sorted relative-path order with original bytes.
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].0, "core/bar.svd");
    assert_eq!(entries[0].1, BAR_CONTENT.as_bytes());
    assert_eq!(entries[1].0, "core/foo.svd");
    assert_eq!(entries[1].1, FOO_CONTENT.as_bytes());
}

#[test]
fn test_package_record_matches_disk_artifact() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    run_indexer(dir.path());

    let manifest = load_manifest(dir.path());
    let gzip = &manifest["packages"]["core"]["files"]["gzip"];

    let bytes = fs::read(dir.path().join("core.tar.gz")).unwrap();
    assert_eq!(gzip["hash"], digest_bytes(&bytes).as_str());
    assert_eq!(gzip["size"].as_u64().unwrap(), bytes.len() as u64);
}

#[test]
fn test_sidecar_covers_all_manifest_renditions() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    run_indexer(dir.path());

    let sidecar = fs::read_to_string(dir.path().join("index.hash")).unwrap();
    let lines: Vec<&str> = sidecar.lines().collect();
    assert_eq!(lines.len(), 3);

    // Plain first, then codecs in precedence order; each digest matches a
    // recomputation over the published artifact's bytes.
    for (line, basename) in lines
        .iter()
        .zip(["index.json", "index.json.gz", "index.json.zstd"])
    {
        let (name, hex) = line.split_once(' ').unwrap();
        assert_eq!(name, basename);
        let bytes = fs::read(dir.path().join(basename)).unwrap();
        assert_eq!(hex, digest_bytes(&bytes).as_str());
    }
    assert!(sidecar.ends_with('\n'));
}

#[test]
fn test_rerun_is_deterministic_apart_from_timestamp() {
    let first_dir = tempfile::tempdir().unwrap();
    let second_dir = tempfile::tempdir().unwrap();
    write_fixture(first_dir.path());
    write_fixture(second_dir.path());

    run_indexer(first_dir.path());
    run_indexer(second_dir.path());

    let first = load_manifest(first_dir.path());
    let second = load_manifest(second_dir.path());
    assert_eq!(first["files"], second["files"]);
    assert_eq!(first["packages"], second["packages"]);
    assert_eq!(first["source"]["url"], second["source"]["url"]);

    // Every non-manifest artifact is byte-identical across runs.
    for artifact in [
        "core/foo.svd.gz",
        "core/foo.svd.zstd",
        "core.tar.gz",
        "core.tar.zstd",
    ] {
        assert_eq!(
            fs::read(first_dir.path().join(artifact)).unwrap(),
            fs::read(second_dir.path().join(artifact)).unwrap(),
            "artifact {artifact} differs between runs"
        );
    }
}

#[test]
fn test_without_zstd_no_zstd_keys_or_files() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let config = IndexerConfig {
        compression: CompressionOptions {
            enable_zstd: false,
            ..Default::default()
        },
        ..IndexerConfig::new(dir.path())
    };
    svd_index::run(&config, &SilentProgress).unwrap();

    // No .zstd file anywhere under the data root.
    for entry in walkdir_files(dir.path()) {
        assert!(
            !entry.ends_with(".zstd"),
            "unexpected zstd artifact: {entry}"
        );
    }

    // No zstd key anywhere in the manifest.
    let manifest_text = fs::read_to_string(dir.path().join("index.json")).unwrap();
    assert!(!manifest_text.contains("zstd"));

    // Sidecar lists only the plain and gzip renditions.
    let sidecar = fs::read_to_string(dir.path().join("index.hash")).unwrap();
    assert_eq!(sidecar.lines().count(), 2);
}

#[test]
fn test_nested_namespaces_produce_ancestor_packages() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("vendor/family")).unwrap();
    fs::write(dir.path().join("vendor/family/chip.svd"), "<device/>").unwrap();

    let report = run_indexer(dir.path());
    assert_eq!(report.file_count, 1);
    assert_eq!(report.package_count, 2);

    let manifest = load_manifest(dir.path());
    let packages = manifest["packages"].as_object().unwrap();
    assert!(packages.contains_key("vendor"));
    assert!(packages.contains_key("vendor.family"));

    // Both ancestors contain the same leaf document.
    for pkg in ["vendor", "vendor.family"] {
        assert_eq!(
            manifest["packages"][pkg]["contents"]["vendor.family.chip"],
            "vendor/family/chip.svd"
        );
    }
    assert!(dir.path().join("vendor.tar.gz").exists());
    assert!(dir.path().join("vendor.family.tar.gz").exists());
}

fn walkdir_files(root: &Path) -> Vec<String> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let entry = entry.unwrap();
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                files.push(path.to_string_lossy().to_string());
            }
        }
    }
    files
}
