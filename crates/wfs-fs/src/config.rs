//! Adapter configuration and format-agnostic loading and saving

use crate::error::{Cause, Error, ErrorKind, Result};
use crate::path::LogicalPath;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Default quota requested from the host: 50 MiB.
pub const DEFAULT_QUOTA_BYTES: u64 = 50 * 1024 * 1024;

/// Default read chunk size: 64 KiB.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Settings for one filesystem instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    /// Sandbox root for every operation. Must be absolute.
    pub repository: String,
    /// Bytes requested during quota negotiation and root acquisition.
    pub quota_bytes: u64,
    /// Chunk size for reads without an explicit size hint.
    pub buffer_size: usize,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            repository: "/".to_string(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl FsConfig {
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            ..Self::default()
        }
    }

    pub fn with_quota_bytes(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Normalized repository path.
    ///
    /// Rejects relative repositories; `/` alone is allowed.
    pub fn repository_path(&self) -> Result<LogicalPath> {
        let raw = self.repository.replace('\\', "/");
        if !raw.starts_with('/') {
            return Err(Error::new(
                ErrorKind::Other,
                self.repository.clone(),
                "",
                format!("repository must be absolute, got '{}'", self.repository),
            ));
        }
        Ok(LogicalPath::new(raw))
    }
}

/// Format-agnostic configuration store.
///
/// The format follows the file extension:
/// - `.toml` -> TOML
/// - `.json` -> JSON
/// - `.yaml`, `.yml` -> YAML
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, &e))?;

        match extension_of(path)?.as_str() {
            "toml" => toml::from_str(&content).map_err(|e| Error::config(path, "TOML", e.to_string())),
            "json" => {
                serde_json::from_str(&content).map_err(|e| Error::config(path, "JSON", e.to_string()))
            }
            _ => serde_yaml::from_str(&content)
                .map_err(|e| Error::config(path, "YAML", e.to_string())),
        }
    }

    /// Save a value, replacing the file atomically.
    pub fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let content = match extension_of(path)?.as_str() {
            "toml" => toml::to_string_pretty(value)
                .map_err(|e| Error::config(path, "TOML", e.to_string()))?,
            "json" => serde_json::to_string_pretty(value)
                .map_err(|e| Error::config(path, "JSON", e.to_string()))?,
            _ => serde_yaml::to_string(value)
                .map_err(|e| Error::config(path, "YAML", e.to_string()))?,
        };

        write_atomic(path, content.as_bytes())
    }
}

fn extension_of(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match extension.as_str() {
        "toml" | "json" | "yaml" | "yml" => Ok(extension),
        _ => Err(Error::new(
            ErrorKind::NotSupported,
            "",
            path.display().to_string(),
            Cause::UnsupportedFormat { extension },
        )),
    }
}

/// Replace `path` with `content`. Readers see the old file or the new one,
/// never a partial write.
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, &e))?;

    // Same directory as the target, so the final rename stays on one filesystem.
    let mut staged = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, &e))?;
    staged
        .write_all(content)
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|e| Error::io(staged.path(), &e))?;
    staged.persist(path).map_err(|e| Error::io(path, &e.error))?;
    Ok(())
}
