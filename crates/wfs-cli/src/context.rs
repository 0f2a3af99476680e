//! Filesystem context for a CLI invocation
//!
//! Settings are layered: defaults, then the configuration file, then flags
//! and environment variables.

use std::path::PathBuf;

use wfs_fs::{ConfigStore, FileSystem, FsConfig};
use wfs_storage::disk::DiskHost;

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// Resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    pub sandbox: PathBuf,
    pub config: FsConfig,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => ConfigStore::new().load::<FsConfig>(path)?,
            None => FsConfig::default(),
        };

        if let Some(repository) = &cli.repository {
            config.repository = repository.clone();
        }
        if let Some(buffer_size) = cli.buffer_size {
            if buffer_size == 0 {
                return Err(CliError::user("--buffer-size must be greater than zero"));
            }
            config.buffer_size = buffer_size;
        }

        tracing::debug!(
            sandbox = %cli.sandbox.display(),
            repository = %config.repository,
            "Resolved context"
        );

        Ok(Self {
            sandbox: cli.sandbox.clone(),
            config,
        })
    }

    /// A facade over the sandbox directory.
    pub fn filesystem(&self) -> Result<FileSystem> {
        Ok(FileSystem::new(
            DiskHost::new(&self.sandbox),
            self.config.clone(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("wfs.toml");
        std::fs::write(&config_path, "repository = \"/from-file\"\nbuffer_size = 4\n").unwrap();

        let cli = Cli::parse_from([
            "wfs",
            "--config",
            config_path.to_str().unwrap(),
            "--repository",
            "/from-flag",
            "config",
        ]);
        let ctx = Context::from_cli(&cli).unwrap();

        assert_eq!(ctx.config.repository, "/from-flag");
        assert_eq!(ctx.config.buffer_size, 4);
    }

    #[test]
    fn zero_buffer_size_is_rejected() {
        let cli = Cli::parse_from(["wfs", "--buffer-size", "0", "config"]);
        let err = Context::from_cli(&cli).unwrap_err();
        assert!(matches!(err, CliError::User { .. }));
    }

    #[test]
    fn relative_repository_fails_at_construction() {
        let cli = Cli::parse_from(["wfs", "--repository", "relative", "config"]);
        let ctx = Context::from_cli(&cli).unwrap();
        assert!(matches!(ctx.filesystem(), Err(CliError::Fs(_))));
    }
}
