//! Quota negotiation and storage-root acquisition

use crate::entry::DirectoryEntry;
use crate::StorageResult;
use async_trait::async_trait;
use std::sync::Arc;

/// A capability that grants persistent storage quota.
#[async_trait]
pub trait QuotaManager: Send + Sync {
    /// Request `bytes` of persistent quota. Returns the granted amount.
    async fn request_quota(&self, bytes: u64) -> StorageResult<u64>;
}

/// The environment a sandboxed storage area is obtained from.
///
/// Hosts expose zero, one or both quota capabilities. Callers prefer the
/// legacy manager when it is present.
#[async_trait]
pub trait StorageHost: Send + Sync {
    /// Legacy, environment-global quota manager.
    fn legacy_quota_manager(&self) -> Option<Arc<dyn QuotaManager>>;

    /// Newer persistent-storage quota capability.
    fn persistent_storage(&self) -> Option<Arc<dyn QuotaManager>>;

    /// Obtain the persistent storage area of `bytes` capacity.
    async fn request_file_system(&self, bytes: u64) -> StorageResult<FileSystemHandle>;
}

/// An acquired storage area and its root directory.
#[derive(Clone, Debug)]
pub struct FileSystemHandle(Arc<Inner>);

#[derive(Debug)]
struct Inner {
    name: String,
    root: DirectoryEntry,
}

impl FileSystemHandle {
    pub fn new(name: impl Into<String>, root: DirectoryEntry) -> Self {
        Self(Arc::new(Inner {
            name: name.into(),
            root,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn root(&self) -> &DirectoryEntry {
        &self.0.root
    }

    /// Whether both handles came from the same acquisition.
    pub fn same_handle(&self, other: &FileSystemHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
