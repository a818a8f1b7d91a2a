// crates/jobs/src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing job artifacts.
///
/// Only *write* failures are surfaced to callers; readers treat corrupt
/// or missing artifacts as absent (see [`crate::JobStore`]).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Job artifact not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied accessing {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize job artifact {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from [`crate::JobManager::submit`].
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The pool no longer accepts work. The job was persisted as
    /// `Pending` but will not run in this process.
    #[error("worker pool is shut down, job {id} was not enqueued")]
    PoolShutDown { id: uuid::Uuid },
}

impl StoreError {
    /// Classify a raw IO error by kind, keeping the offending path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }

    pub fn serialize(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Serialize {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_classification() {
        let err = StoreError::io(
            "/jobs/x/metadata.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, StoreError::NotFound { .. }));

        let err = StoreError::io(
            "/jobs/x/metadata.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(err, StoreError::PermissionDenied { .. }));

        let err = StoreError::io(
            "/jobs/x/metadata.json",
            std::io::Error::new(std::io::ErrorKind::TimedOut, "slow disk"),
        );
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn display_includes_path() {
        let err = StoreError::io("/jobs/abc/results.json", std::io::Error::other("boom"));
        assert!(err.to_string().contains("/jobs/abc/results.json"));
    }
}
