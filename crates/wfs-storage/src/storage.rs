//! The path-addressed storage primitive and its event-driven writer

use crate::{Blob, StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Options for looking up an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetOptions {
    /// Create the entry if it does not exist. The parent must exist.
    pub create: bool,
    /// With `create`, fail if the entry already exists.
    pub exclusive: bool,
}

impl GetOptions {
    /// Look up an existing entry only.
    pub fn existing() -> Self {
        Self::default()
    }

    /// Look up the entry, creating it if absent.
    pub fn create() -> Self {
        Self {
            create: true,
            exclusive: false,
        }
    }
}

/// Kind of an entry in the storage tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
        }
    }
}

/// Metadata reported for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub modification_time: DateTime<Utc>,
    /// File length in bytes. Always 0 for directories.
    pub size: u64,
}

/// Result of a single writer mutation.
///
/// Exactly one outcome is delivered per `write` or `truncate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Success,
    Abort(StorageError),
    Error(StorageError),
}

/// One-shot receiver of a writer mutation's outcome.
pub type CompletionListener = Box<dyn FnOnce(WriteOutcome) + Send>;

/// A handle-based writer over one file.
///
/// `write` and `truncate` only start the mutation. Its outcome is reported
/// to the listener installed with [`FileWriter::set_listener`], possibly
/// after the call has returned. A writer with no listener installed drops
/// outcomes.
pub trait FileWriter: Send {
    /// Offset at which the next write lands.
    fn position(&self) -> u64;

    /// Current file length as seen by this writer.
    fn length(&self) -> u64;

    /// Move the write offset. Offsets past the end clamp to `length()`.
    fn seek(&mut self, offset: u64);

    /// Install or clear the completion listener.
    fn set_listener(&mut self, listener: Option<CompletionListener>);

    /// Write `data` at the current position, advancing it on success.
    fn write(&mut self, data: Blob);

    /// Change the file length to `size`. The position is clamped to it.
    fn truncate(&mut self, size: u64);
}

/// Path-addressed operations of a sandboxed storage area.
///
/// All paths are absolute, `/`-separated and already normalized; entry
/// handles in [`crate::entry`] resolve relative lookups before calling in.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Look up (or create) a file.
    async fn get_file(&self, path: &str, options: GetOptions) -> StorageResult<()>;

    /// Look up (or create) a directory.
    async fn get_directory(&self, path: &str, options: GetOptions) -> StorageResult<()>;

    async fn metadata(&self, path: &str) -> StorageResult<Metadata>;

    /// List the direct children of a directory as `(full path, kind)`.
    async fn read_entries(&self, path: &str) -> StorageResult<Vec<(String, EntryKind)>>;

    /// Remove a file or an empty directory.
    async fn remove(&self, path: &str) -> StorageResult<()>;

    /// Remove a directory and everything below it.
    async fn remove_recursively(&self, path: &str) -> StorageResult<()>;

    /// Snapshot the content of a file.
    async fn file(&self, path: &str) -> StorageResult<Blob>;

    /// Open a writer positioned at offset 0.
    async fn create_writer(&self, path: &str) -> StorageResult<Box<dyn FileWriter>>;

    /// Native URL for an entry, when the storage can offer one.
    fn url(&self, path: &str) -> Option<String>;
}
