use super::MemoryStorage;
use crate::entry::DirectoryEntry;
use crate::host::{FileSystemHandle, QuotaManager, StorageHost};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Which quota capability a [`MemoryHost`] exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuotaMode {
    /// Only the legacy global quota manager.
    Legacy,
    /// Only the persistent-storage capability.
    #[default]
    Persistent,
    /// Both capabilities.
    Both,
    /// Neither; quota is granted implicitly.
    Implicit,
}

#[derive(Debug, Default)]
struct Counters {
    legacy_requests: AtomicUsize,
    persistent_requests: AtomicUsize,
    file_system_requests: AtomicUsize,
    granted_bytes: AtomicU64,
}

/// In-process [`StorageHost`] backed by a single [`MemoryStorage`].
///
/// Every successful `request_file_system` hands out a fresh handle over the
/// same storage, sized to the requested bytes, and request counters let tests observe how often quota and
/// root acquisition actually happened.
#[derive(Clone)]
pub struct MemoryHost {
    storage: MemoryStorage,
    mode: QuotaMode,
    deny_quota: bool,
    deny_file_system: bool,
    counters: Arc<Counters>,
}

/// Builder for [`MemoryHost`].
#[derive(Debug, Default)]
pub struct MemoryHostBuilder {
    storage: Option<MemoryStorage>,
    mode: QuotaMode,
    deny_quota: bool,
    deny_file_system: bool,
}

impl MemoryHostBuilder {
    pub fn quota_mode(mut self, mode: QuotaMode) -> Self {
        self.mode = mode;
        self
    }

    /// Reject every quota request.
    pub fn deny_quota(mut self) -> Self {
        self.deny_quota = true;
        self
    }

    /// Reject every storage-root request.
    pub fn deny_file_system(mut self) -> Self {
        self.deny_file_system = true;
        self
    }

    /// Serve an existing storage instead of a fresh one.
    pub fn storage(mut self, storage: MemoryStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn build(self) -> MemoryHost {
        MemoryHost {
            storage: self.storage.unwrap_or_default(),
            mode: self.mode,
            deny_quota: self.deny_quota,
            deny_file_system: self.deny_file_system,
            counters: Arc::new(Counters::default()),
        }
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> MemoryHostBuilder {
        MemoryHostBuilder::default()
    }

    pub fn storage(&self) -> &MemoryStorage {
        &self.storage
    }

    /// Quota requests made through either capability.
    pub fn quota_requests(&self) -> usize {
        self.counters.legacy_requests.load(Ordering::SeqCst)
            + self.counters.persistent_requests.load(Ordering::SeqCst)
    }

    pub fn legacy_quota_requests(&self) -> usize {
        self.counters.legacy_requests.load(Ordering::SeqCst)
    }

    pub fn persistent_quota_requests(&self) -> usize {
        self.counters.persistent_requests.load(Ordering::SeqCst)
    }

    pub fn file_system_requests(&self) -> usize {
        self.counters.file_system_requests.load(Ordering::SeqCst)
    }

    /// Total quota granted so far.
    pub fn granted_bytes(&self) -> u64 {
        self.counters.granted_bytes.load(Ordering::SeqCst)
    }

    fn quota_manager(&self, legacy: bool) -> Arc<dyn QuotaManager> {
        Arc::new(MemoryQuota {
            legacy,
            deny: self.deny_quota,
            counters: Arc::clone(&self.counters),
        })
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageHost for MemoryHost {
    fn legacy_quota_manager(&self) -> Option<Arc<dyn QuotaManager>> {
        matches!(self.mode, QuotaMode::Legacy | QuotaMode::Both).then(|| self.quota_manager(true))
    }

    fn persistent_storage(&self) -> Option<Arc<dyn QuotaManager>> {
        matches!(self.mode, QuotaMode::Persistent | QuotaMode::Both)
            .then(|| self.quota_manager(false))
    }

    async fn request_file_system(&self, bytes: u64) -> StorageResult<FileSystemHandle> {
        self.counters
            .file_system_requests
            .fetch_add(1, Ordering::SeqCst);
        // Let concurrent callers interleave with an acquisition in flight.
        tokio::task::yield_now().await;

        if self.deny_file_system {
            return Err(StorageError::security(format!(
                "persistent storage of {bytes} bytes was denied"
            )));
        }
        self.storage.set_capacity(bytes);
        let root = DirectoryEntry::root(Arc::new(self.storage.clone()));
        Ok(FileSystemHandle::new("memory", root))
    }
}

struct MemoryQuota {
    legacy: bool,
    deny: bool,
    counters: Arc<Counters>,
}

#[async_trait]
impl QuotaManager for MemoryQuota {
    async fn request_quota(&self, bytes: u64) -> StorageResult<u64> {
        let counter = if self.legacy {
            &self.counters.legacy_requests
        } else {
            &self.counters.persistent_requests
        };
        counter.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if self.deny {
            return Err(StorageError::quota_exceeded(format!(
                "quota request for {bytes} bytes was denied"
            )));
        }
        self.counters.granted_bytes.fetch_add(bytes, Ordering::SeqCst);
        Ok(bytes)
    }
}
