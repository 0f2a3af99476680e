//! Promise-style virtual filesystem over sandboxed storage
//!
//! [`FileSystem`] adapts a quota-managed, callback-driven storage area (see
//! `wfs-storage`) to plain async operations scoped to one repository
//! directory:
//!
//! - quota negotiation and root acquisition happen once, lazily
//! - paths resolve to files or directories through a concurrent dual probe
//! - reads are chunked cursors, writes are sessions with seek, append and
//!   truncate
//! - every storage failure is classified into a small [`ErrorKind`] set

pub mod config;
pub mod convert;
pub mod directory;
pub mod error;
pub mod filesystem;
pub mod handles;
pub mod path;
pub mod quota;
pub mod read_stream;
pub mod resolver;
pub mod write_stream;

pub use config::{ConfigStore, DEFAULT_BUFFER_SIZE, DEFAULT_QUOTA_BYTES, FsConfig};
pub use convert::Source;
pub use directory::{DirectoryAdapter, Item, MakeDirectoryOptions};
pub use error::{Cause, Error, ErrorKind, Result};
pub use filesystem::{FileSystem, Props, Stats, UrlOptions, UrlType};
pub use handles::{DirectoryHandle, FileHandle};
pub use path::LogicalPath;
pub use quota::QuotaInitializer;
pub use read_stream::{ReadOptions, ReadStream};
pub use resolver::EntryResolver;
pub use write_stream::{WriteOptions, WriteStream};

pub use wfs_storage::EntryKind;
