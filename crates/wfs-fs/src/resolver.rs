//! File-or-directory resolution of logical paths

use crate::error::{Error, Result};
use crate::path::{LogicalPath, join_paths};
use tracing::debug;
use wfs_storage::{DirectoryEntry, Entry, FileEntry, GetOptions};

/// Resolves logical paths inside one repository against a storage root.
///
/// Nothing is cached: every call probes the storage again.
#[derive(Debug, Clone)]
pub struct EntryResolver {
    repository: LogicalPath,
}

impl EntryResolver {
    pub fn new(repository: LogicalPath) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &LogicalPath {
        &self.repository
    }

    pub fn full_path(&self, path: &LogicalPath) -> String {
        join_paths(&self.repository, path)
    }

    /// Resolve `path` as whichever kind it exists as.
    ///
    /// Both probes run concurrently and both settle before a result is
    /// chosen. A file wins over a directory. When both fail, the directory
    /// probe's error is reported if the file probe only failed because of a
    /// kind mismatch; otherwise the file probe's error is.
    pub async fn resolve(&self, root: &DirectoryEntry, path: &LogicalPath) -> Result<Entry> {
        let full_path = self.full_path(path);
        let (as_file, as_directory) = tokio::join!(
            root.get_file(&full_path, GetOptions::existing()),
            root.get_directory(&full_path, GetOptions::existing()),
        );

        match (as_file, as_directory) {
            (Ok(file), _) => {
                debug!(%path, "resolved as file");
                Ok(Entry::File(file))
            }
            (Err(_), Ok(directory)) => {
                debug!(%path, "resolved as directory");
                Ok(Entry::Directory(directory))
            }
            (Err(file_err), Err(dir_err)) => {
                let file_err = self.map(path, file_err);
                let dir_err = self.map(path, dir_err);
                debug!(%path, file = %file_err.kind(), directory = %dir_err.kind(), "unresolved");
                if file_err.is_type_mismatch() {
                    Err(dir_err)
                } else {
                    Err(file_err)
                }
            }
        }
    }

    /// Resolve `path` as a file only.
    pub async fn resolve_file(
        &self,
        root: &DirectoryEntry,
        path: &LogicalPath,
        options: GetOptions,
    ) -> Result<FileEntry> {
        root.get_file(&self.full_path(path), options)
            .await
            .map_err(|e| self.map(path, e))
    }

    /// Resolve `path` as a directory only.
    pub async fn resolve_directory(
        &self,
        root: &DirectoryEntry,
        path: &LogicalPath,
        options: GetOptions,
    ) -> Result<DirectoryEntry> {
        root.get_directory(&self.full_path(path), options)
            .await
            .map_err(|e| self.map(path, e))
    }

    pub(crate) fn map(&self, path: &LogicalPath, cause: wfs_storage::StorageError) -> Error {
        Error::map(self.repository.as_str(), path.as_str(), cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use async_trait::async_trait;
    use rstest::rstest;
    use std::sync::Arc;
    use wfs_storage::memory::MemoryStorage;
    use wfs_storage::{
        Blob, EntryKind, FileWriter, Metadata, Storage, StorageError, StorageErrorCode,
        StorageResult,
    };

    async fn fixture() -> (DirectoryEntry, EntryResolver) {
        let root = DirectoryEntry::root(Arc::new(MemoryStorage::new()));
        root.get_directory("/repo", GetOptions::create()).await.unwrap();
        root.get_directory("/repo/dir", GetOptions::create()).await.unwrap();
        root.get_file("/repo/file.txt", GetOptions::create()).await.unwrap();
        (root, EntryResolver::new(LogicalPath::new("/repo")))
    }

    #[tokio::test]
    async fn resolves_files() {
        let (root, resolver) = fixture().await;
        let entry = resolver.resolve(&root, &"/file.txt".into()).await.unwrap();
        assert_eq!(entry.kind(), EntryKind::File);
        assert_eq!(entry.full_path(), "/repo/file.txt");
    }

    #[tokio::test]
    async fn resolves_directories() {
        let (root, resolver) = fixture().await;
        let entry = resolver.resolve(&root, &"/dir".into()).await.unwrap();
        assert_eq!(entry.kind(), EntryKind::Directory);
    }

    #[tokio::test]
    async fn resolves_repository_root() {
        let (root, resolver) = fixture().await;
        let entry = resolver.resolve(&root, &LogicalPath::root()).await.unwrap();
        assert!(entry.is_directory());
        assert_eq!(entry.full_path(), "/repo");
    }

    #[tokio::test]
    async fn missing_path_is_not_found() {
        let (root, resolver) = fixture().await;
        let err = resolver.resolve(&root, &"/nope".into()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.path(), "/nope");
        assert_eq!(err.repository(), "/repo");
    }

    #[tokio::test]
    async fn path_below_a_file_is_not_found() {
        let (root, resolver) = fixture().await;
        let err = resolver
            .resolve(&root, &"/file.txt/child".into())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    /// Storage whose probes fail with fixed codes.
    struct Probes {
        file: StorageErrorCode,
        directory: StorageErrorCode,
    }

    #[async_trait]
    impl Storage for Probes {
        async fn get_file(&self, path: &str, _: GetOptions) -> StorageResult<()> {
            Err(StorageError::new(self.file, path))
        }
        async fn get_directory(&self, path: &str, _: GetOptions) -> StorageResult<()> {
            Err(StorageError::new(self.directory, path))
        }
        async fn metadata(&self, path: &str) -> StorageResult<Metadata> {
            Err(StorageError::not_found(path))
        }
        async fn read_entries(&self, path: &str) -> StorageResult<Vec<(String, EntryKind)>> {
            Err(StorageError::not_found(path))
        }
        async fn remove(&self, path: &str) -> StorageResult<()> {
            Err(StorageError::not_found(path))
        }
        async fn remove_recursively(&self, path: &str) -> StorageResult<()> {
            Err(StorageError::not_found(path))
        }
        async fn file(&self, path: &str) -> StorageResult<Blob> {
            Err(StorageError::not_found(path))
        }
        async fn create_writer(&self, path: &str) -> StorageResult<Box<dyn FileWriter>> {
            Err(StorageError::not_found(path))
        }
        fn url(&self, _: &str) -> Option<String> {
            None
        }
    }

    #[rstest]
    #[case(StorageErrorCode::TypeMismatch, StorageErrorCode::Security, ErrorKind::NotAllowed)]
    #[case(StorageErrorCode::TypeMismatch, StorageErrorCode::NotFound, ErrorKind::NotFound)]
    #[case(StorageErrorCode::NotFound, StorageErrorCode::TypeMismatch, ErrorKind::NotFound)]
    #[case(StorageErrorCode::Security, StorageErrorCode::NotFound, ErrorKind::NotAllowed)]
    #[tokio::test]
    async fn failure_precedence(
        #[case] file: StorageErrorCode,
        #[case] directory: StorageErrorCode,
        #[case] expected: ErrorKind,
    ) {
        let root = DirectoryEntry::root(Arc::new(Probes { file, directory }));
        let resolver = EntryResolver::new(LogicalPath::root());
        let err = resolver.resolve(&root, &"/x".into()).await.unwrap_err();
        assert_eq!(err.kind(), expected);
    }

    #[tokio::test]
    async fn single_kind_lookups_report_mismatch() {
        let (root, resolver) = fixture().await;
        let err = resolver
            .resolve_file(&root, &"/dir".into(), GetOptions::existing())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);

        let err = resolver
            .resolve_directory(&root, &"/file.txt".into(), GetOptions::existing())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }
}
