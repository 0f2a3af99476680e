use super::DiskStorage;
use crate::entry::DirectoryEntry;
use crate::host::{FileSystemHandle, QuotaManager, StorageHost};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// [`StorageHost`] that serves a sandbox directory of the host filesystem.
///
/// Quota is granted implicitly; neither quota capability is exposed.
#[derive(Debug, Clone)]
pub struct DiskHost {
    sandbox_dir: PathBuf,
}

impl DiskHost {
    pub fn new(sandbox_dir: impl Into<PathBuf>) -> Self {
        Self {
            sandbox_dir: sandbox_dir.into(),
        }
    }

    pub fn sandbox_dir(&self) -> &Path {
        &self.sandbox_dir
    }
}

#[async_trait]
impl StorageHost for DiskHost {
    fn legacy_quota_manager(&self) -> Option<Arc<dyn QuotaManager>> {
        None
    }

    fn persistent_storage(&self) -> Option<Arc<dyn QuotaManager>> {
        None
    }

    async fn request_file_system(&self, _bytes: u64) -> StorageResult<FileSystemHandle> {
        let sandbox_path = self.sandbox_dir.display().to_string();
        tokio::fs::create_dir_all(&self.sandbox_dir)
            .await
            .map_err(|e| StorageError::io(&sandbox_path, &e))?;
        let storage =
            DiskStorage::new(&self.sandbox_dir).map_err(|e| StorageError::io(&sandbox_path, &e))?;
        tracing::debug!(sandbox = %sandbox_path, "Opened disk storage");
        Ok(FileSystemHandle::new(sandbox_path, DirectoryEntry::root(Arc::new(storage))))
    }
}
