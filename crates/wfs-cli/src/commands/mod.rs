//! Command implementations for wfs-cli

pub mod config;
pub mod content;
pub mod entries;

pub use config::run_config;
pub use content::{run_append, run_cat, run_write};
pub use entries::{run_ls, run_mkdir, run_rm, run_stat, run_url};
