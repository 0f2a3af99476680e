//! Sandboxed storage primitive for wfs
//!
//! A quota-managed, path-addressed storage area: a [`StorageHost`] negotiates
//! quota and hands out a [`FileSystemHandle`] whose root [`DirectoryEntry`]
//! resolves file and directory entries. Files are read as [`Blob`] snapshots
//! and written through an event-driven [`FileWriter`].

pub mod blob;
pub mod disk;
pub mod entry;
pub mod error;
pub mod host;
pub mod memory;
pub mod paths;
pub mod storage;

pub use blob::Blob;
pub use entry::{DirectoryEntry, Entry, FileEntry};
pub use error::{StorageError, StorageErrorCode, StorageResult};
pub use host::{FileSystemHandle, QuotaManager, StorageHost};
pub use storage::{
    CompletionListener, EntryKind, FileWriter, GetOptions, Metadata, Storage, WriteOutcome,
};
