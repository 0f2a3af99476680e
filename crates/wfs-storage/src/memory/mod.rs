//! In-memory storage backend
//!
//! Suitable for tests and for embedding a throwaway sandbox. The host can be
//! configured to expose either quota capability, to deny quota or the
//! storage root, and the storage can inject writer faults.

mod host;
mod storage;

pub use host::{MemoryHost, MemoryHostBuilder, QuotaMode};
pub use storage::{DEFAULT_CAPACITY_BYTES, MemoryStorage, MemoryWriter, WriteFault};
