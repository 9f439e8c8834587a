//! Locating test data and creating scratch directories.

use std::path::PathBuf;

/// Returns the workspace root directory.
///
/// Derived from this crate's manifest directory (`crates/test-utils`).
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Searches for a real sample file.
///
/// Checks `SAMPLE_DATA_DIR` (if set), then `<workspace>/samples/` and
/// `<workspace>/testdata/`. Real WRF and emissions samples live on the HPC
/// filesystem and are usually absent in CI.
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(dir) = std::env::var("SAMPLE_DATA_DIR") {
        candidates.push(PathBuf::from(dir).join(name));
    }

    let root = workspace_root();
    candidates.push(root.join("samples").join(name));
    candidates.push(root.join("testdata").join(name));

    candidates.into_iter().find(|p| p.exists())
}

/// Creates a temporary directory, removed when the returned value drops.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Creates a temporary directory with a name prefix.
pub fn temp_test_dir_with_prefix(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temporary test directory")
}
