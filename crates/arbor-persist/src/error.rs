//! Error types for persistent stores
//!
//! I/O failures are split by cause: `PermissionDenied` is reported as the
//! `Invalid*` variant of the operation, every other failure as `Fail*`.

use arbor_convert::ConvertError;
use arbor_path::PathError;
use std::io;
use std::path::PathBuf;

/// Errors during persistent store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Namespace cannot be mapped to a file
    #[error("invalid namespace: {0:?}")]
    InvalidNamespace(String),

    /// Store constructed without a backing path
    #[error("persistent store requires a backing path")]
    MissingPath,

    /// Store configuration rejected by the path index
    #[error("invalid store configuration: {0}")]
    InvalidConfig(#[from] PathError),

    /// Write not permitted
    #[error("not permitted to write {path}: {source}")]
    InvalidWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Write failed
    #[error("failed to write {path}: {source}")]
    FailWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Read not permitted
    #[error("not permitted to read {path}: {source}")]
    InvalidRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Read failed
    #[error("failed to read {path}: {source}")]
    FailRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Delete not permitted
    #[error("not permitted to delete {path}: {source}")]
    InvalidDestroy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Delete failed
    #[error("failed to delete {path}: {source}")]
    FailDestroy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Stale file left behind after a format change
    #[error("failed to delete stale file {path}: {source}")]
    FailClean {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No converter registered for format
    #[error("no converter registered for format: '{0}'")]
    UnknownFormat(String),

    /// Content could not be encoded or decoded
    #[error("conversion failed for {path}: {source}")]
    Convert {
        path: PathBuf,
        #[source]
        source: ConvertError,
    },
}

/// Fieldless discriminant of [`StoreError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    InvalidNamespace,
    MissingPath,
    InvalidConfig,
    InvalidWrite,
    FailWrite,
    InvalidRead,
    FailRead,
    InvalidDestroy,
    FailDestroy,
    FailClean,
    UnknownFormat,
    Convert,
}

fn denied(source: &io::Error) -> bool {
    source.kind() == io::ErrorKind::PermissionDenied
}

impl StoreError {
    /// Classify a read failure for path
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if denied(&source) {
            Self::InvalidRead { path, source }
        } else {
            Self::FailRead { path, source }
        }
    }

    /// Classify a write failure for path
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if denied(&source) {
            Self::InvalidWrite { path, source }
        } else {
            Self::FailWrite { path, source }
        }
    }

    /// Classify a delete failure for path
    pub fn destroy(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if denied(&source) {
            Self::InvalidDestroy { path, source }
        } else {
            Self::FailDestroy { path, source }
        }
    }

    /// Create stale-file cleanup error for path
    pub fn clean(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FailClean {
            path: path.into(),
            source,
        }
    }

    /// Create conversion error for path
    pub fn convert(path: impl Into<PathBuf>, source: ConvertError) -> Self {
        Self::Convert {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            Self::InvalidNamespace(_) => StoreErrorKind::InvalidNamespace,
            Self::MissingPath => StoreErrorKind::MissingPath,
            Self::InvalidConfig(_) => StoreErrorKind::InvalidConfig,
            Self::InvalidWrite { .. } => StoreErrorKind::InvalidWrite,
            Self::FailWrite { .. } => StoreErrorKind::FailWrite,
            Self::InvalidRead { .. } => StoreErrorKind::InvalidRead,
            Self::FailRead { .. } => StoreErrorKind::FailRead,
            Self::InvalidDestroy { .. } => StoreErrorKind::InvalidDestroy,
            Self::FailDestroy { .. } => StoreErrorKind::FailDestroy,
            Self::FailClean { .. } => StoreErrorKind::FailClean,
            Self::UnknownFormat(_) => StoreErrorKind::UnknownFormat,
            Self::Convert { .. } => StoreErrorKind::Convert,
        }
    }
}

/// Result type alias for persistent store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_is_invalid() {
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(StoreError::read("a.json", denied).kind(), StoreErrorKind::InvalidRead);

        let missing = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(StoreError::read("a.json", missing).kind(), StoreErrorKind::FailRead);
    }

    #[test]
    fn write_and_destroy_classification() {
        let denied = || io::Error::from(io::ErrorKind::PermissionDenied);
        let other = || io::Error::other("disk full");
        assert_eq!(StoreError::write("x", denied()).kind(), StoreErrorKind::InvalidWrite);
        assert_eq!(StoreError::write("x", other()).kind(), StoreErrorKind::FailWrite);
        assert_eq!(StoreError::destroy("x", denied()).kind(), StoreErrorKind::InvalidDestroy);
        assert_eq!(StoreError::destroy("x", other()).kind(), StoreErrorKind::FailDestroy);
        assert_eq!(StoreError::clean("x", other()).kind(), StoreErrorKind::FailClean);
    }

    #[test]
    fn display_includes_path() {
        let err = StoreError::write("/tmp/app.json", io::Error::other("boom"));
        assert_eq!(err.to_string(), "failed to write /tmp/app.json: boom");
    }
}
