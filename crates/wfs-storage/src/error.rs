//! Error types for wfs-storage

/// Result type for storage primitive operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Failure codes reported by the storage primitive.
///
/// These mirror the error names a sandboxed filesystem reports to its
/// success/error callbacks. The adapter layer maps them onto its own
/// smaller vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageErrorCode {
    NotFound,
    Security,
    Abort,
    NotReadable,
    Encoding,
    NoModificationAllowed,
    InvalidState,
    Syntax,
    InvalidModification,
    QuotaExceeded,
    TypeMismatch,
    PathExists,
    Io,
}

impl StorageErrorCode {
    /// Get the error name as reported by the primitive.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NotFoundError",
            Self::Security => "SecurityError",
            Self::Abort => "AbortError",
            Self::NotReadable => "NotReadableError",
            Self::Encoding => "EncodingError",
            Self::NoModificationAllowed => "NoModificationAllowedError",
            Self::InvalidState => "InvalidStateError",
            Self::Syntax => "SyntaxError",
            Self::InvalidModification => "InvalidModificationError",
            Self::QuotaExceeded => "QuotaExceededError",
            Self::TypeMismatch => "TypeMismatchError",
            Self::PathExists => "PathExistsError",
            Self::Io => "IoError",
        }
    }
}

impl std::fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error reported by the storage primitive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct StorageError {
    pub code: StorageErrorCode,
    pub message: String,
}

impl StorageError {
    pub fn new(code: StorageErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(path: &str) -> Self {
        Self::new(StorageErrorCode::NotFound, format!("{path} does not exist"))
    }

    pub fn type_mismatch(path: &str, expected: &str) -> Self {
        Self::new(
            StorageErrorCode::TypeMismatch,
            format!("{path} is not a {expected}"),
        )
    }

    pub fn invalid_modification(message: impl Into<String>) -> Self {
        Self::new(StorageErrorCode::InvalidModification, message)
    }

    pub fn security(message: impl Into<String>) -> Self {
        Self::new(StorageErrorCode::Security, message)
    }

    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::new(StorageErrorCode::QuotaExceeded, message)
    }

    /// Classify a host I/O error.
    pub fn io(path: &str, source: &std::io::Error) -> Self {
        use std::io::ErrorKind;

        let code = match source.kind() {
            ErrorKind::NotFound => StorageErrorCode::NotFound,
            ErrorKind::PermissionDenied => StorageErrorCode::Security,
            ErrorKind::AlreadyExists => StorageErrorCode::PathExists,
            ErrorKind::NotADirectory | ErrorKind::IsADirectory => StorageErrorCode::TypeMismatch,
            ErrorKind::DirectoryNotEmpty => StorageErrorCode::InvalidModification,
            ErrorKind::StorageFull | ErrorKind::QuotaExceeded => StorageErrorCode::QuotaExceeded,
            _ => StorageErrorCode::Io,
        };
        Self::new(code, format!("{path}: {source}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_name_and_message() {
        let err = StorageError::not_found("/a/b");
        assert_eq!(err.to_string(), "NotFoundError: /a/b does not exist");
    }

    #[test]
    fn io_errors_are_classified() {
        let source = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert_eq!(StorageError::io("/x", &source).code, StorageErrorCode::NotFound);

        let source = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert_eq!(StorageError::io("/x", &source).code, StorageErrorCode::Security);

        let source = std::io::Error::other("boom");
        assert_eq!(StorageError::io("/x", &source).code, StorageErrorCode::Io);
    }
}
