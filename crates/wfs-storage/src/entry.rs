//! Entry handles returned by the storage primitive
//!
//! Handles are cheap to clone: a full path plus a shared reference to the
//! storage that produced them. Nothing is cached; every method goes back to
//! the storage.

use crate::storage::{EntryKind, FileWriter, GetOptions, Metadata, Storage};
use crate::{Blob, StorageResult, paths};
use std::sync::Arc;

/// Handle to a file.
#[derive(Clone)]
pub struct FileEntry {
    full_path: String,
    storage: Arc<dyn Storage>,
}

/// Handle to a directory.
#[derive(Clone)]
pub struct DirectoryEntry {
    full_path: String,
    storage: Arc<dyn Storage>,
}

/// Handle to either kind of entry.
#[derive(Clone, Debug)]
pub enum Entry {
    File(FileEntry),
    Directory(DirectoryEntry),
}

impl FileEntry {
    pub(crate) fn new(full_path: String, storage: Arc<dyn Storage>) -> Self {
        Self { full_path, storage }
    }

    pub fn name(&self) -> &str {
        paths::name(&self.full_path)
    }

    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    pub async fn metadata(&self) -> StorageResult<Metadata> {
        self.storage.metadata(&self.full_path).await
    }

    /// Snapshot the current content.
    pub async fn file(&self) -> StorageResult<Blob> {
        self.storage.file(&self.full_path).await
    }

    pub async fn create_writer(&self) -> StorageResult<Box<dyn FileWriter>> {
        self.storage.create_writer(&self.full_path).await
    }

    pub async fn remove(&self) -> StorageResult<()> {
        self.storage.remove(&self.full_path).await
    }

    pub fn to_url(&self) -> Option<String> {
        self.storage.url(&self.full_path)
    }
}

impl DirectoryEntry {
    /// Root directory of a storage area.
    pub fn root(storage: Arc<dyn Storage>) -> Self {
        Self {
            full_path: "/".to_string(),
            storage,
        }
    }

    pub fn name(&self) -> &str {
        paths::name(&self.full_path)
    }

    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// Look up a file relative to this directory (or absolute).
    pub async fn get_file(&self, path: &str, options: GetOptions) -> StorageResult<FileEntry> {
        let full_path = paths::resolve(&self.full_path, path);
        self.storage.get_file(&full_path, options).await?;
        Ok(FileEntry::new(full_path, Arc::clone(&self.storage)))
    }

    /// Look up a directory relative to this directory (or absolute).
    pub async fn get_directory(
        &self,
        path: &str,
        options: GetOptions,
    ) -> StorageResult<DirectoryEntry> {
        let full_path = paths::resolve(&self.full_path, path);
        self.storage.get_directory(&full_path, options).await?;
        Ok(DirectoryEntry {
            full_path,
            storage: Arc::clone(&self.storage),
        })
    }

    /// List the direct children.
    pub async fn read_entries(&self) -> StorageResult<Vec<Entry>> {
        let entries = self.storage.read_entries(&self.full_path).await?;
        Ok(entries
            .into_iter()
            .map(|(full_path, kind)| match kind {
                EntryKind::File => Entry::File(FileEntry::new(full_path, Arc::clone(&self.storage))),
                EntryKind::Directory => Entry::Directory(DirectoryEntry {
                    full_path,
                    storage: Arc::clone(&self.storage),
                }),
            })
            .collect())
    }

    pub async fn metadata(&self) -> StorageResult<Metadata> {
        self.storage.metadata(&self.full_path).await
    }

    /// Remove this directory. Fails unless it is empty.
    pub async fn remove(&self) -> StorageResult<()> {
        self.storage.remove(&self.full_path).await
    }

    pub async fn remove_recursively(&self) -> StorageResult<()> {
        self.storage.remove_recursively(&self.full_path).await
    }

    pub fn to_url(&self) -> Option<String> {
        self.storage.url(&self.full_path)
    }
}

impl Entry {
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::File(_) => EntryKind::File,
            Self::Directory(_) => EntryKind::Directory,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    pub fn full_path(&self) -> &str {
        match self {
            Self::File(f) => f.full_path(),
            Self::Directory(d) => d.full_path(),
        }
    }

    pub async fn metadata(&self) -> StorageResult<Metadata> {
        match self {
            Self::File(f) => f.metadata().await,
            Self::Directory(d) => d.metadata().await,
        }
    }

    pub async fn remove(&self) -> StorageResult<()> {
        match self {
            Self::File(f) => f.remove().await,
            Self::Directory(d) => d.remove().await,
        }
    }

    pub fn to_url(&self) -> Option<String> {
        match self {
            Self::File(f) => f.to_url(),
            Self::Directory(d) => d.to_url(),
        }
    }
}

impl std::fmt::Debug for FileEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileEntry")
            .field("full_path", &self.full_path)
            .finish()
    }
}

impl std::fmt::Debug for DirectoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryEntry")
            .field("full_path", &self.full_path)
            .finish()
    }
}
