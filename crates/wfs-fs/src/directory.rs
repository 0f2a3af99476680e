//! Directory listing, creation and removal

use crate::error::{Error, Result};
use crate::path::{LogicalPath, strip_repository};
use crate::resolver::EntryResolver;
use tracing::debug;
use wfs_storage::{DirectoryEntry, EntryKind, GetOptions};

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Repository-relative path of the child.
    pub path: LogicalPath,
    pub kind: EntryKind,
}

impl Item {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Options for [`DirectoryAdapter::make`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MakeDirectoryOptions {
    /// Create missing ancestors too.
    pub create_parents: bool,
}

impl MakeDirectoryOptions {
    pub fn parents() -> Self {
        Self {
            create_parents: true,
        }
    }
}

/// Directory operations on a storage root, scoped to one repository.
#[derive(Debug, Clone)]
pub struct DirectoryAdapter {
    resolver: EntryResolver,
}

impl DirectoryAdapter {
    pub fn new(resolver: EntryResolver) -> Self {
        Self { resolver }
    }

    /// Direct children of `path`, in storage order.
    pub async fn list(&self, root: &DirectoryEntry, path: &LogicalPath) -> Result<Vec<Item>> {
        let directory = self
            .resolver
            .resolve_directory(root, path, GetOptions::existing())
            .await?;
        let entries = directory
            .read_entries()
            .await
            .map_err(|e| self.resolver.map(path, e))?;

        let repository = self.resolver.repository();
        let items: Vec<Item> = entries
            .iter()
            .filter_map(|entry| {
                strip_repository(repository, entry.full_path()).map(|path| Item {
                    path,
                    kind: entry.kind(),
                })
            })
            .collect();
        debug!(%path, count = items.len(), "listed directory");
        Ok(items)
    }

    /// Create `path`. An existing directory is left as is.
    pub async fn make(
        &self,
        root: &DirectoryEntry,
        path: &LogicalPath,
        options: MakeDirectoryOptions,
    ) -> Result<()> {
        if options.create_parents {
            let mut levels: Vec<LogicalPath> = path.ancestors().collect();
            levels.reverse();
            for level in levels {
                self.resolver
                    .resolve_directory(root, &level, GetOptions::create())
                    .await
                    .map_err(|e| relabel(e, path))?;
            }
        } else {
            self.resolver
                .resolve_directory(root, path, GetOptions::create())
                .await?;
        }
        debug!(%path, parents = options.create_parents, "made directory");
        Ok(())
    }

    /// Remove an empty directory.
    pub async fn remove(&self, root: &DirectoryEntry, path: &LogicalPath) -> Result<()> {
        let directory = self
            .resolver
            .resolve_directory(root, path, GetOptions::existing())
            .await?;
        directory
            .remove()
            .await
            .map_err(|e| self.resolver.map(path, e))?;
        debug!(%path, "removed directory");
        Ok(())
    }

    /// Remove a directory and everything below it.
    pub async fn remove_all(&self, root: &DirectoryEntry, path: &LogicalPath) -> Result<()> {
        let directory = self
            .resolver
            .resolve_directory(root, path, GetOptions::existing())
            .await?;
        directory
            .remove_recursively()
            .await
            .map_err(|e| self.resolver.map(path, e))?;
        debug!(%path, "removed directory tree");
        Ok(())
    }

    /// Remove a file.
    pub async fn remove_file(&self, root: &DirectoryEntry, path: &LogicalPath) -> Result<()> {
        let file = self
            .resolver
            .resolve_file(root, path, GetOptions::existing())
            .await?;
        file.remove().await.map_err(|e| self.resolver.map(path, e))?;
        debug!(%path, "removed file");
        Ok(())
    }
}

/// Report an ancestor failure against the requested path.
fn relabel(err: Error, path: &LogicalPath) -> Error {
    Error::new(err.kind(), err.repository(), path.as_str(), err.cause().clone())
}
