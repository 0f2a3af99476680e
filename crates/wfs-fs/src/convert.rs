//! Conversion between caller data and the storage's byte units

use crate::error::{Error, ErrorKind, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use wfs_storage::Blob;

/// Input accepted by the write helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Bytes(Bytes),
    /// Standard base64 with padding.
    Base64(String),
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Bytes> for Source {
    fn from(data: Bytes) -> Self {
        Self::Bytes(data)
    }
}

impl From<Vec<u8>> for Source {
    fn from(data: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(data))
    }
}

impl From<&[u8]> for Source {
    fn from(data: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(data))
    }
}

/// Canonical bytes of a source.
pub fn to_bytes(source: Source) -> Result<Bytes> {
    match source {
        Source::Text(text) => Ok(Bytes::from(text)),
        Source::Bytes(data) => Ok(data),
        Source::Base64(encoded) => STANDARD
            .decode(encoded.trim())
            .map(Bytes::from)
            .map_err(|e| Error::new(ErrorKind::Other, "", "", format!("invalid base64: {e}"))),
    }
}

/// Wrap bytes in the unit the storage writer accepts.
pub fn to_blob(data: Bytes) -> Blob {
    Blob::new(data)
}

/// Encode content as a self-contained `data:` URL.
pub fn data_url(content_type: &str, data: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(data))
}

/// Best-effort content type from a file name.
pub fn content_type_for(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "txt" | "md" | "log" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "toml" => "application/toml",
        "yaml" | "yml" => "application/yaml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
