//! [`TestSandbox`] for disk-backed test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wfs_fs::{FileSystem, FsConfig};
use wfs_storage::disk::DiskHost;

/// A temporary host directory acting as the storage root of a disk backend.
///
/// # Example
///
/// ```rust,no_run
/// use wfs_test_utils::TestSandbox;
///
/// let sandbox = TestSandbox::new();
/// let fs = sandbox.fs("/sandbox");
/// sandbox.write_host_file("sandbox/a.txt", "seeded");
/// ```
pub struct TestSandbox {
    temp_dir: TempDir,
}

impl Default for TestSandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSandbox {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Host directory backing the storage root.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn host(&self) -> DiskHost {
        DiskHost::new(self.root())
    }

    /// A facade scoped to `repository` with default settings.
    pub fn fs(&self, repository: &str) -> FileSystem {
        self.fs_with(FsConfig::new(repository))
    }

    pub fn fs_with(&self, config: FsConfig) -> FileSystem {
        FileSystem::new(self.host(), config)
            .unwrap_or_else(|e| panic!("TestSandbox::fs_with: {e}"))
    }

    /// Host path of a storage-relative path.
    pub fn host_path(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(self.root().to_path_buf(), |acc, s| acc.join(s))
    }

    /// Write a file directly on the host, creating parents.
    pub fn write_host_file(&self, relative: &str, content: &str) {
        let path = self.host_path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn read_host_file(&self, relative: &str) -> String {
        fs::read_to_string(self.host_path(relative))
            .unwrap_or_else(|e| panic!("failed to read {relative}: {e}"))
    }

    pub fn assert_file_exists(&self, relative: &str) {
        assert!(
            self.host_path(relative).is_file(),
            "expected file {relative} to exist"
        );
    }

    pub fn assert_dir_exists(&self, relative: &str) {
        assert!(
            self.host_path(relative).is_dir(),
            "expected directory {relative} to exist"
        );
    }

    pub fn assert_missing(&self, relative: &str) {
        assert!(
            !self.host_path(relative).exists(),
            "expected {relative} to be absent"
        );
    }

    pub fn assert_file_contains(&self, relative: &str, expected: &str) {
        let content = self.read_host_file(relative);
        assert!(
            content.contains(expected),
            "{relative} does not contain {expected:?}:\n{content}"
        );
    }
}
