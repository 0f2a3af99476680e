//! Error types for wfs-fs
//!
//! Every failure leaving the adapter is an [`Error`] carrying one
//! [`ErrorKind`], the repository and logical path of the operation, and the
//! original cause. Callers branch on the kind only.

use std::path::PathBuf;
use wfs_storage::{StorageError, StorageErrorCode};

/// Result type for wfs-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// The stable error vocabulary of the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Quota negotiation was rejected.
    QuotaExceeded,
    /// The storage root could not be acquired.
    NotAllowed,
    /// The adapter cannot perform the requested operation.
    NotSupported,
    /// The entry exists with the other kind (file vs. directory).
    TypeMismatch,
    /// The entry does not exist.
    NotFound,
    /// A write or truncate was aborted before completion.
    Abort,
    /// A write or truncate failed.
    NoModificationAllowed,
    /// Any other failure.
    Other,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuotaExceeded => "QuotaExceededError",
            Self::NotAllowed => "NotAllowedError",
            Self::NotSupported => "NotSupportedError",
            Self::TypeMismatch => "TypeMismatchError",
            Self::NotFound => "NotFoundError",
            Self::Abort => "AbortError",
            Self::NoModificationAllowed => "NoModificationAllowedError",
            Self::Other => "Error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The original failure behind an [`Error`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Cause {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Message(String),

    #[error("failed to parse {format} config at {path}: {message}")]
    Config {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("I/O error at {path}: {message}")]
    Io { path: PathBuf, message: String },
}

impl From<String> for Cause {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for Cause {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

/// An adapter failure. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {path} (repository {repository}): {cause}")]
pub struct Error {
    kind: ErrorKind,
    repository: String,
    path: String,
    #[source]
    cause: Cause,
}

impl Error {
    /// Build an error of a known kind.
    pub fn new(
        kind: ErrorKind,
        repository: impl Into<String>,
        path: impl Into<String>,
        cause: impl Into<Cause>,
    ) -> Self {
        Self {
            kind,
            repository: repository.into(),
            path: path.into(),
            cause: cause.into(),
        }
    }

    /// Classify a storage primitive failure.
    pub fn map(repository: impl Into<String>, path: impl Into<String>, cause: StorageError) -> Self {
        Self::new(kind_of(&cause), repository, path, cause)
    }

    pub fn not_supported(
        repository: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::NotSupported, repository, path, Cause::Message(message.into()))
    }

    pub fn config(path: impl Into<PathBuf>, format: &str, message: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorKind::Other,
            "",
            path.display().to_string(),
            Cause::Config {
                path,
                format: format.to_string(),
                message: message.into(),
            },
        )
    }

    pub fn io(path: impl Into<PathBuf>, source: &std::io::Error) -> Self {
        let path = path.into();
        let kind = match source.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::NotAllowed,
            _ => ErrorKind::Other,
        };
        Self::new(
            kind,
            "",
            path.display().to_string(),
            Cause::Io {
                path,
                message: source.to_string(),
            },
        )
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Logical path of the failed operation.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    /// Whether the failure only says the entry has the other kind.
    pub fn is_type_mismatch(&self) -> bool {
        self.kind == ErrorKind::TypeMismatch
    }
}

/// Kind for a storage error code.
///
/// Codes outside the adapter vocabulary map to [`ErrorKind::Other`]; the
/// code itself stays available through the cause.
pub fn kind_of(cause: &StorageError) -> ErrorKind {
    match cause.code {
        StorageErrorCode::NotFound => ErrorKind::NotFound,
        StorageErrorCode::TypeMismatch => ErrorKind::TypeMismatch,
        StorageErrorCode::QuotaExceeded => ErrorKind::QuotaExceeded,
        StorageErrorCode::Security => ErrorKind::NotAllowed,
        StorageErrorCode::Abort => ErrorKind::Abort,
        StorageErrorCode::NoModificationAllowed => ErrorKind::NoModificationAllowed,
        StorageErrorCode::NotReadable
        | StorageErrorCode::Encoding
        | StorageErrorCode::InvalidState
        | StorageErrorCode::Syntax
        | StorageErrorCode::InvalidModification
        | StorageErrorCode::PathExists
        | StorageErrorCode::Io => ErrorKind::Other,
    }
}
