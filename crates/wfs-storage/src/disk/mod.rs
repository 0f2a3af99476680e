//! Host-filesystem storage backend
//!
//! Maps the storage root onto a sandbox directory. Writer mutations run on
//! spawned tokio tasks and complete asynchronously.

mod host;
mod storage;

pub use host::DiskHost;
pub use storage::{DiskStorage, DiskWriter};
