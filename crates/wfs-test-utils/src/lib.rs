//! Shared test utilities for the wfs workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`sandbox`]: [`TestSandbox`](sandbox::TestSandbox), a temporary host
//!   directory served through the disk backend
//! - [`memory`]: in-memory facades with access to the host's counters and
//!   fault injection

pub mod memory;
pub mod sandbox;

pub use memory::MemoryFixture;
pub use sandbox::TestSandbox;
