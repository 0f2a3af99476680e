//! One-time quota negotiation and storage-root acquisition

use crate::error::{Error, ErrorKind, Result};
use crate::path::LogicalPath;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use wfs_storage::{FileSystemHandle, GetOptions, StorageHost};

/// Acquires the storage handle once and memoizes the outcome.
///
/// Concurrent callers arriving before the first acquisition settles wait on
/// the same attempt. A failure is memoized as well: there is no retry path,
/// a new instance must be created instead.
pub struct QuotaInitializer {
    host: Arc<dyn StorageHost>,
    repository: LogicalPath,
    quota_bytes: u64,
    handle: OnceCell<Result<FileSystemHandle>>,
}

impl QuotaInitializer {
    pub fn new(host: Arc<dyn StorageHost>, repository: LogicalPath, quota_bytes: u64) -> Self {
        Self {
            host,
            repository,
            quota_bytes,
            handle: OnceCell::new(),
        }
    }

    /// The memoized storage handle, acquiring it on first use.
    pub async fn acquire(&self) -> Result<FileSystemHandle> {
        self.handle
            .get_or_init(|| self.initialize())
            .await
            .clone()
    }

    /// Whether an acquisition has settled, successfully or not.
    pub fn is_settled(&self) -> bool {
        self.handle.initialized()
    }

    async fn initialize(&self) -> Result<FileSystemHandle> {
        let repository = self.repository.as_str();
        let bytes = self.quota_bytes;

        let manager = self
            .host
            .legacy_quota_manager()
            .map(|m| ("legacy", m))
            .or_else(|| self.host.persistent_storage().map(|m| ("persistent", m)));
        match manager {
            Some((capability, manager)) => {
                debug!(capability, bytes, "requesting quota");
                let granted = manager.request_quota(bytes).await.map_err(|e| {
                    warn!(capability, error = %e, "quota request rejected");
                    Error::new(ErrorKind::QuotaExceeded, repository, "/", e)
                })?;
                debug!(capability, granted, "quota granted");
            }
            None => debug!("no quota capability, relying on implicit grant"),
        }

        let handle = self.host.request_file_system(bytes).await.map_err(|e| {
            warn!(error = %e, "storage root request rejected");
            Error::new(ErrorKind::NotAllowed, repository, "/", e)
        })?;

        // Create the repository one level at a time so nested roots work.
        let mut levels: Vec<LogicalPath> = self.repository.ancestors().collect();
        levels.reverse();
        for level in levels {
            handle
                .root()
                .get_directory(level.as_str(), GetOptions::create())
                .await
                .map_err(|e| Error::map(repository, "/", e))?;
        }

        info!(name = handle.name(), repository, "storage acquired");
        Ok(handle)
    }
}

impl std::fmt::Debug for QuotaInitializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaInitializer")
            .field("repository", &self.repository)
            .field("quota_bytes", &self.quota_bytes)
            .field("settled", &self.is_settled())
            .finish()
    }
}
