//! Path-bound file and directory handles

use crate::convert::Source;
use crate::directory::{Item, MakeDirectoryOptions};
use crate::error::{Error, ErrorKind, Result};
use crate::filesystem::{FileSystem, Stats, UrlOptions};
use crate::path::LogicalPath;
use crate::read_stream::{ReadOptions, ReadStream};
use crate::write_stream::{WriteOptions, WriteStream};
use bytes::Bytes;

/// A file path bound to a [`FileSystem`].
#[derive(Debug, Clone)]
pub struct FileHandle {
    fs: FileSystem,
    path: LogicalPath,
}

impl FileHandle {
    pub(crate) fn new(fs: FileSystem, path: LogicalPath) -> Self {
        Self { fs, path }
    }

    pub fn path(&self) -> &LogicalPath {
        &self.path
    }

    pub async fn stat(&self) -> Result<Stats> {
        self.fs.stat_entry(&self.path).await
    }

    pub async fn read(&self) -> Result<Bytes> {
        self.fs.read_file(&self.path).await
    }

    /// Content decoded as UTF-8.
    pub async fn read_to_string(&self) -> Result<String> {
        let content = self.read().await?;
        String::from_utf8(content.to_vec()).map_err(|e| {
            Error::new(
                ErrorKind::Other,
                self.fs.repository().as_str(),
                self.path.as_str(),
                format!("content is not UTF-8: {e}"),
            )
        })
    }

    pub async fn write(&self, data: impl Into<Source>) -> Result<()> {
        self.fs.write_file(&self.path, data).await
    }

    pub async fn append(&self, data: impl Into<Source>) -> Result<()> {
        self.fs.append_file(&self.path, data).await
    }

    pub async fn open_read(&self, options: ReadOptions) -> Result<ReadStream> {
        self.fs.open_read_stream(&self.path, options).await
    }

    pub async fn open_write(&self, options: WriteOptions) -> Result<WriteStream> {
        self.fs.open_write_stream(&self.path, options).await
    }

    pub async fn remove(&self) -> Result<()> {
        self.fs.remove_file(&self.path).await
    }

    pub async fn to_url(&self, options: UrlOptions) -> Result<String> {
        self.fs.to_url(&self.path, false, options).await
    }
}

/// A directory path bound to a [`FileSystem`].
#[derive(Debug, Clone)]
pub struct DirectoryHandle {
    fs: FileSystem,
    path: LogicalPath,
}

impl DirectoryHandle {
    pub(crate) fn new(fs: FileSystem, path: LogicalPath) -> Self {
        Self { fs, path }
    }

    pub fn path(&self) -> &LogicalPath {
        &self.path
    }

    /// Handle to a file below this directory.
    pub fn file(&self, name: &str) -> FileHandle {
        FileHandle::new(self.fs.clone(), self.path.join(name))
    }

    /// Handle to a directory below this directory.
    pub fn directory(&self, name: &str) -> DirectoryHandle {
        DirectoryHandle::new(self.fs.clone(), self.path.join(name))
    }

    pub async fn stat(&self) -> Result<Stats> {
        self.fs.stat_entry(&self.path).await
    }

    pub async fn list(&self) -> Result<Vec<Item>> {
        self.fs.list_directory(&self.path).await
    }

    pub async fn make(&self, options: MakeDirectoryOptions) -> Result<()> {
        self.fs.make_directory(&self.path, options).await
    }

    pub async fn remove(&self) -> Result<()> {
        self.fs.remove_directory(&self.path).await
    }

    pub async fn remove_all(&self) -> Result<()> {
        self.fs.remove_directory_all(&self.path).await
    }

    pub async fn to_url(&self, options: UrlOptions) -> Result<String> {
        self.fs.to_url(&self.path, true, options).await
    }
}
