//! Temporary output directories for file-producing tests.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory removed when dropped.
pub struct TestOutputDir {
    dir: TempDir,
}

impl TestOutputDir {
    /// Create a fresh directory with a recognizable prefix.
    pub fn new() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("flood-risk-test-")
            .tempdir()
            .expect("failed to create temporary test directory");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of `name` inside the directory.
    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

impl Default for TestOutputDir {
    fn default() -> Self {
        Self::new()
    }
}
