//! The filesystem facade

use crate::config::FsConfig;
use crate::convert::{self, Source};
use crate::directory::{DirectoryAdapter, Item, MakeDirectoryOptions};
use crate::error::{Error, ErrorKind, Result};
use crate::handles::{DirectoryHandle, FileHandle};
use crate::path::LogicalPath;
use crate::quota::QuotaInitializer;
use crate::read_stream::{ReadOptions, ReadStream};
use crate::resolver::EntryResolver;
use crate::write_stream::{WriteOptions, WriteStream};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use wfs_storage::{DirectoryEntry, Entry, EntryKind, FileSystemHandle, GetOptions, StorageHost};

/// Free-form metadata properties, as accepted by [`FileSystem::patch_metadata`].
pub type Props = serde_json::Map<String, serde_json::Value>;

/// Entry metadata returned by [`FileSystem::stat_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub modified: DateTime<Utc>,
    /// Present for files only.
    pub size: Option<u64>,
}

impl Stats {
    pub fn is_file(&self) -> bool {
        self.size.is_some()
    }
}

/// Kind of URL requested from [`FileSystem::to_url`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UrlType {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl std::fmt::Display for UrlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrlOptions {
    pub url_type: UrlType,
}

/// A virtual filesystem over a sandboxed, quota-managed storage host.
///
/// Every operation is scoped to the configured repository. The storage
/// handle is acquired lazily on the first operation and shared by all clones
/// of the facade.
#[derive(Clone)]
pub struct FileSystem {
    inner: Arc<Inner>,
}

struct Inner {
    config: FsConfig,
    resolver: EntryResolver,
    directories: DirectoryAdapter,
    quota: QuotaInitializer,
}

impl FileSystem {
    pub fn new<H: StorageHost + 'static>(host: H, config: FsConfig) -> Result<Self> {
        Self::with_host(Arc::new(host), config)
    }

    pub fn with_host(host: Arc<dyn StorageHost>, config: FsConfig) -> Result<Self> {
        let repository = config.repository_path()?;
        let resolver = EntryResolver::new(repository.clone());
        debug!(%repository, quota_bytes = config.quota_bytes, "created filesystem");
        Ok(Self {
            inner: Arc::new(Inner {
                directories: DirectoryAdapter::new(resolver.clone()),
                quota: QuotaInitializer::new(host, repository, config.quota_bytes),
                resolver,
                config,
            }),
        })
    }

    pub fn repository(&self) -> &LogicalPath {
        self.inner.resolver.repository()
    }

    pub fn config(&self) -> &FsConfig {
        &self.inner.config
    }

    /// The memoized storage handle.
    pub async fn storage_handle(&self) -> Result<FileSystemHandle> {
        self.inner.quota.acquire().await
    }

    async fn root(&self) -> Result<DirectoryEntry> {
        Ok(self.storage_handle().await?.root().clone())
    }

    /// Handle to the file at `path`. No I/O happens until it is used.
    pub fn file(&self, path: impl Into<LogicalPath>) -> FileHandle {
        FileHandle::new(self.clone(), path.into())
    }

    /// Handle to the directory at `path`. No I/O happens until it is used.
    pub fn directory(&self, path: impl Into<LogicalPath>) -> DirectoryHandle {
        DirectoryHandle::new(self.clone(), path.into())
    }

    /// Resolve `path` as a file or a directory.
    pub async fn resolve(&self, path: impl Into<LogicalPath>) -> Result<Entry> {
        let root = self.root().await?;
        self.inner.resolver.resolve(&root, &path.into()).await
    }

    pub async fn list_directory(&self, path: impl Into<LogicalPath>) -> Result<Vec<Item>> {
        let root = self.root().await?;
        self.inner.directories.list(&root, &path.into()).await
    }

    pub async fn make_directory(
        &self,
        path: impl Into<LogicalPath>,
        options: MakeDirectoryOptions,
    ) -> Result<()> {
        let root = self.root().await?;
        self.inner.directories.make(&root, &path.into(), options).await
    }

    /// Remove an empty directory.
    pub async fn remove_directory(&self, path: impl Into<LogicalPath>) -> Result<()> {
        let root = self.root().await?;
        self.inner.directories.remove(&root, &path.into()).await
    }

    /// Remove a directory and everything below it.
    pub async fn remove_directory_all(&self, path: impl Into<LogicalPath>) -> Result<()> {
        let root = self.root().await?;
        self.inner.directories.remove_all(&root, &path.into()).await
    }

    pub async fn remove_file(&self, path: impl Into<LogicalPath>) -> Result<()> {
        let root = self.root().await?;
        self.inner.directories.remove_file(&root, &path.into()).await
    }

    /// Open a read cursor. The file is probed on every read, not here.
    pub async fn open_read_stream(
        &self,
        path: impl Into<LogicalPath>,
        options: ReadOptions,
    ) -> Result<ReadStream> {
        let root = self.root().await?;
        Ok(ReadStream::new(
            root,
            self.inner.resolver.clone(),
            path.into(),
            options,
            self.inner.config.buffer_size,
        ))
    }

    /// Open a write session.
    ///
    /// With `create` the file is created before the stream is returned;
    /// without it a missing file fails with `NotFound`.
    pub async fn open_write_stream(
        &self,
        path: impl Into<LogicalPath>,
        options: WriteOptions,
    ) -> Result<WriteStream> {
        let path = path.into();
        let root = self.root().await?;
        let lookup = if options.create {
            GetOptions::create()
        } else {
            GetOptions::existing()
        };
        self.inner.resolver.resolve_file(&root, &path, lookup).await?;
        Ok(WriteStream::new(
            root,
            self.inner.resolver.clone(),
            path,
            options,
        ))
    }

    pub async fn stat_entry(&self, path: impl Into<LogicalPath>) -> Result<Stats> {
        let path = path.into();
        let root = self.root().await?;
        let entry = self.inner.resolver.resolve(&root, &path).await?;
        let metadata = entry
            .metadata()
            .await
            .map_err(|e| self.inner.resolver.map(&path, e))?;
        Ok(Stats {
            modified: metadata.modification_time,
            size: entry.is_file().then_some(metadata.size),
        })
    }

    /// A retrievable URL for the entry at `path`.
    ///
    /// Native URLs are preferred. Without one, a directory cannot be
    /// materialized and a file is inlined as a `data:` URL.
    pub async fn to_url(
        &self,
        path: impl Into<LogicalPath>,
        is_directory: bool,
        options: UrlOptions,
    ) -> Result<String> {
        let path = path.into();
        if options.url_type != UrlType::Get {
            return Err(Error::not_supported(
                self.repository().as_str(),
                path.as_str(),
                format!("\"{}\" is not supported", options.url_type),
            ));
        }

        let root = self.root().await?;
        let entry = self.inner.resolver.resolve(&root, &path).await?;
        if let Some(url) = entry.to_url() {
            return Ok(url);
        }
        if is_directory {
            return Err(Error::new(
                ErrorKind::TypeMismatch,
                self.repository().as_str(),
                path.as_str(),
                format!("directory \"{path}\" cannot be materialized as a URL"),
            ));
        }

        let content = self.read_file(&path).await?;
        let content_type = convert::content_type_for(path.file_name().unwrap_or_default());
        Ok(convert::data_url(content_type, &content))
    }

    /// Metadata patches are not supported by sandboxed storage.
    pub async fn patch_metadata(&self, path: impl Into<LogicalPath>, _props: &Props) -> Result<()> {
        Err(Error::not_supported(
            self.repository().as_str(),
            path.into().as_str(),
            "patch is not supported",
        ))
    }

    /// Whole content of a file.
    pub async fn read_file(&self, path: impl Into<LogicalPath>) -> Result<Bytes> {
        let mut stream = self.open_read_stream(path, ReadOptions::default()).await?;
        let content = stream.read_all().await;
        stream.close();
        content
    }

    /// Replace the content of a file, creating it if needed.
    pub async fn write_file(&self, path: impl Into<LogicalPath>, data: impl Into<Source>) -> Result<()> {
        self.write_with(path.into(), data.into(), WriteOptions::default())
            .await
    }

    /// Append to a file, creating it if needed.
    pub async fn append_file(&self, path: impl Into<LogicalPath>, data: impl Into<Source>) -> Result<()> {
        self.write_with(path.into(), data.into(), WriteOptions::append())
            .await
    }

    async fn write_with(&self, path: LogicalPath, data: Source, options: WriteOptions) -> Result<()> {
        let data = convert::to_bytes(data).map_err(|e| {
            Error::new(e.kind(), self.repository().as_str(), path.as_str(), e.cause().clone())
        })?;
        let mut stream = self.open_write_stream(path, options).await?;
        if !data.is_empty() {
            stream.write(data).await?;
        } else if !options.append {
            // Nothing to write, but the old content still goes.
            stream.truncate(0).await?;
        }
        stream.close();
        Ok(())
    }

    /// Kind of the entry at `path`, or `None` when nothing exists there.
    pub async fn kind_of(&self, path: impl Into<LogicalPath>) -> Result<Option<EntryKind>> {
        match self.resolve(path).await {
            Ok(entry) => Ok(Some(entry.kind())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for FileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSystem")
            .field("config", &self.inner.config)
            .field("quota", &self.inner.quota)
            .finish()
    }
}
