//! In-memory facades for tests that need to observe the host.

use wfs_fs::{FileSystem, FsConfig};
use wfs_storage::memory::{MemoryHost, MemoryStorage, QuotaMode, WriteFault};

/// A facade over a [`MemoryHost`], keeping the host for inspection.
pub struct MemoryFixture {
    pub fs: FileSystem,
    pub host: MemoryHost,
}

impl MemoryFixture {
    /// Default host (persistent quota capability), default settings.
    pub fn new(repository: &str) -> Self {
        Self::with_host(MemoryHost::new(), FsConfig::new(repository))
    }

    pub fn with_quota_mode(repository: &str, mode: QuotaMode) -> Self {
        let host = MemoryHost::builder().quota_mode(mode).build();
        Self::with_host(host, FsConfig::new(repository))
    }

    pub fn with_host(host: MemoryHost, config: FsConfig) -> Self {
        let fs = FileSystem::new(host.clone(), config)
            .unwrap_or_else(|e| panic!("MemoryFixture::with_host: {e}"));
        Self { fs, host }
    }

    pub fn storage(&self) -> &MemoryStorage {
        self.host.storage()
    }

    /// Arm a fault for the next writer mutation.
    pub fn fail_next_write(&self, fault: WriteFault) {
        self.storage().fail_next_write(fault);
    }

    /// A second facade over the same storage, with its own acquisition.
    pub fn sibling(&self, repository: &str) -> FileSystem {
        let host = MemoryHost::builder().storage(self.storage().clone()).build();
        FileSystem::new(host, FsConfig::new(repository))
            .unwrap_or_else(|e| panic!("MemoryFixture::sibling: {e}"))
    }
}
